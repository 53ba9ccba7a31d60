use padaccheda::{Analyzer, NodeId, ParseOutcome, ParseReport, SolutionTree};

mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const DIM: &str = "\x1b[2m";
    pub const BOLD: &str = "\x1b[1m";

    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";

    pub struct Palette {
        enabled: bool,
    }

    impl Palette {
        pub fn new(enabled: bool) -> Self {
            Self { enabled }
        }

        pub fn paint(&self, s: impl AsRef<str>, color: &str) -> String {
            if self.enabled { format!("{}{}{}", color, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn bold(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", BOLD, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn dim(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", DIM, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }
    }
}

pub fn print_report(report: &ParseReport, analyzer: &Analyzer, color: bool) {
    let palette = ansi::Palette::new(color);
    println!("\n{}", palette.bold(palette.paint(format!("⚙  Decomposing: \"{}\"", report.entry), ansi::CYAN)));

    println!("\n{}", palette.paint("━━━ Analyses ━━━", ansi::GRAY));
    match &report.outcome {
        ParseOutcome::Cancelled => println!("{}", palette.paint("  Cancelled", ansi::YELLOW)),
        ParseOutcome::Solved(tree) if tree.is_empty() => {
            println!("{}", palette.dim("  No analysis found"));
            println!("\n{}", palette.paint("Possible reasons:", ansi::YELLOW));
            println!("  • No rule is defined for the requested label");
            println!("  • No sandhi split produced attested constituents");
            println!("  • Carried parameters conflict");
            println!("\n{}", palette.dim("  Tip: rerun with --debug to keep failed branches"));
        }
        ParseOutcome::Solved(tree) => print_tree(tree, analyzer, &palette),
    }

    let m = &report.metrics;
    println!("\n{}", palette.paint("━━━ Search ━━━", ansi::GRAY));
    println!(
        "  Descents: {}  │  Max depth: {}  │  Candidates: {}",
        palette.paint(m.descents.to_string(), ansi::BLUE),
        palette.paint(m.max_depth.to_string(), ansi::BLUE),
        palette.paint(m.candidates.to_string(), ansi::BLUE),
    );
    println!(
        "  Rule scans: {}  │  Sandhi scans: {}  │  Cache hits: {}",
        palette.paint(m.cache.rule_scans.to_string(), ansi::YELLOW),
        palette.paint(m.cache.sandhi_scans.to_string(), ansi::YELLOW),
        palette.paint(m.cache.hits.to_string(), ansi::GREEN),
    );

    println!("\n{}", palette.paint("━━━ Timing ━━━", ansi::GRAY));
    println!(
        "  Total: {}  │  Decompose: {}  │  Build: {}",
        palette.paint(format!("{:?}", m.total), ansi::GREEN),
        palette.paint(format!("{:?}", m.decompose), ansi::CYAN),
        palette.dim(format!("{:?}", m.build)),
    );
    println!();
}

fn print_tree(tree: &SolutionTree, analyzer: &Analyzer, palette: &ansi::Palette) {
    for (idx, &root) in tree.roots().iter().enumerate() {
        println!("  {} {}", palette.paint(format!("[{idx}]"), ansi::GRAY), fmt_node(tree, root, analyzer, palette));
        for (depth, id) in tree.walk(root).into_iter().skip(1) {
            println!("  {}{}", "    ".repeat(depth), fmt_node(tree, id, analyzer, palette));
        }
    }
}

fn fmt_node(tree: &SolutionTree, id: NodeId, analyzer: &Analyzer, palette: &ansi::Palette) -> String {
    let node = &tree[id];
    let surface = match node.content.error {
        Some(_) => palette.paint(&node.surface, ansi::RED),
        None if node.is_terminal() => palette.bold(palette.paint(&node.surface, ansi::GREEN)),
        None => palette.paint(&node.surface, ansi::GREEN),
    };

    let mut out = format!(
        "{} {} {} {}",
        surface,
        palette.paint(&node.label, ansi::BLUE),
        palette.dim("│"),
        palette.paint(analyzer.terms().describe(&node.content.parameters), ansi::YELLOW),
    );
    if let (Some(rule), Some(sandhi)) = (node.rule, node.sandhi) {
        out.push_str(&palette.dim(format!(" │ {rule}/{sandhi}")));
    }
    if node.content.id != 0 {
        out.push_str(&palette.dim(format!(" │ #{}", node.content.id)));
    }
    out.push_str(&palette.dim(format!(" │ {:.3}", node.rating)));
    if let Some(error) = node.content.error {
        out.push_str(&format!(" {}", palette.paint(format!("✗ {error}"), ansi::RED)));
    }
    out
}
