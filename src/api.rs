use crate::engine::{
    CancellationToken, Candidate, DepthObserver, Interrupt, LayerContext, ParseCounters, Parser, RatingService,
    RuleManager, RuleSet, RunMetrics, SolutionTree,
};
use crate::error::{EngineError, InitError};
use crate::lexicon::{FrequencySource, Lexicon, MemoryFrequencies, MemoryLexicon};
use crate::params::ParameterVector;
use crate::tables::{Bundle, RuleTables};
use crate::terms::TermIndex;
use crate::ChronologicalLayer;
use std::sync::Arc;
use std::time::Instant;

/// Recursion runs on worker threads; deep analyses need more than the default stack.
const WORKER_STACK_SIZE: usize = 16 * 1024 * 1024;

/// Construction-time engine settings.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Size of the bounded worker pool. `None` uses rayon's default.
    pub workers: Option<usize>,
}

/// Options that affect a single parse.
#[derive(Debug, Clone)]
pub struct Options {
    /// Keep failed branches (no rule, conflicts, unresolved splits) in the tree.
    pub debug_mode: bool,
    /// Weight of the frequency rating in node scores. `0.0` disables rating
    /// lookups, so no chronological layer is needed.
    pub freq_rating_ratio: f64,
}

impl Default for Options {
    fn default() -> Self {
        Options { debug_mode: false, freq_rating_ratio: 1.0 }
    }
}

/// Per-parse session state supplied by the caller.
///
/// The chronological layer lives here rather than in the engine, so parses
/// running under different layers never see each other's setting.
#[derive(Clone, Default)]
pub struct Context {
    pub layer: LayerContext,
    pub cancellation: CancellationToken,
    pub progress: Option<Arc<dyn DepthObserver>>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("layer", &self.layer)
            .field("cancellation", &self.cancellation)
            .field("progress", &self.progress.as_ref().map(|_| "<observer>"))
            .finish()
    }
}

impl Context {
    pub fn with_layer(layer: ChronologicalLayer) -> Self {
        Context { layer: LayerContext::with_layer(layer), ..Self::default() }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn with_progress(mut self, observer: impl DepthObserver + 'static) -> Self {
        self.progress = Some(Arc::new(observer));
        self
    }
}

/// What to analyse.
#[derive(Debug, Clone, Copy)]
pub struct ParseRequest<'a> {
    pub entry: &'a str,
    pub label: &'a str,
    pub parameters: ParameterVector,
}

impl<'a> ParseRequest<'a> {
    /// Request with all parameters wildcarded.
    pub fn new(entry: &'a str, label: &'a str) -> Self {
        ParseRequest { entry, label, parameters: ParameterVector::wildcard() }
    }

    pub fn with_parameters(mut self, parameters: ParameterVector) -> Self {
        self.parameters = parameters;
        self
    }
}

#[derive(Debug, Clone)]
pub enum ParseOutcome {
    Solved(SolutionTree),
    /// The cancellation token was observed; no partial tree is returned.
    Cancelled,
}

impl ParseOutcome {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ParseOutcome::Cancelled)
    }

    pub fn tree(&self) -> Option<&SolutionTree> {
        match self {
            ParseOutcome::Solved(tree) => Some(tree),
            ParseOutcome::Cancelled => None,
        }
    }

    pub fn into_tree(self) -> Option<SolutionTree> {
        match self {
            ParseOutcome::Solved(tree) => Some(tree),
            ParseOutcome::Cancelled => None,
        }
    }
}

/// Result from [`Analyzer::parse_verbose`].
#[derive(Debug, Clone)]
pub struct ParseReport {
    pub entry: String,
    pub outcome: ParseOutcome,
    pub metrics: RunMetrics,
}

/// The decomposition engine bound to one validated rule set.
///
/// Rule and split lookups are memoized across parses until
/// [`clear_caches`](Self::clear_caches) is called.
pub struct Analyzer {
    manager: RuleManager,
    ratings: RatingService,
    lexicon: Arc<dyn Lexicon>,
    pool: rayon::ThreadPool,
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field("rules", &self.manager.rule_set().rules().len())
            .field("cache", &self.manager.stats())
            .field("ratings", &self.ratings)
            .field("workers", &self.pool.current_num_threads())
            .finish()
    }
}

impl Analyzer {
    /// Validate `tables` and build the engine. Fails before any parse if the
    /// tables are inconsistent.
    pub fn new(
        tables: RuleTables,
        lexicon: Arc<dyn Lexicon>,
        frequencies: Arc<dyn FrequencySource>,
        config: EngineConfig,
    ) -> Result<Self, InitError> {
        let rules = Arc::new(RuleSet::compile(tables)?);
        let mut builder = rayon::ThreadPoolBuilder::new()
            .stack_size(WORKER_STACK_SIZE)
            .thread_name(|i| format!("padaccheda-worker-{i}"));
        if let Some(workers) = config.workers {
            builder = builder.num_threads(workers);
        }
        let pool = builder.build()?;

        Ok(Analyzer { manager: RuleManager::new(rules), ratings: RatingService::new(frequencies), lexicon, pool })
    }

    pub fn from_bundle(bundle: Bundle, config: EngineConfig) -> Result<Self, InitError> {
        let lexicon = MemoryLexicon::new(bundle.lexicon)?;
        let frequencies = MemoryFrequencies::new(bundle.frequencies)?;
        Self::new(bundle.tables, Arc::new(lexicon), Arc::new(frequencies), config)
    }

    pub fn rule_set(&self) -> &Arc<RuleSet> {
        self.manager.rule_set()
    }

    pub fn terms(&self) -> &TermIndex {
        self.manager.rule_set().terms()
    }

    pub fn rule_manager(&self) -> &RuleManager {
        &self.manager
    }

    pub fn ratings(&self) -> &RatingService {
        &self.ratings
    }

    /// Drop memoized rule, split and rating lookups.
    pub fn clear_caches(&self) {
        self.manager.clear();
        self.ratings.clear();
    }

    /// Decompose `request.entry` into a ranked tree of alternative analyses.
    ///
    /// # Example
    /// ```
    /// use padaccheda::rules::sample;
    /// use padaccheda::{Context, Options, ParseRequest};
    ///
    /// let analyzer = sample::analyzer().unwrap();
    /// let ctx = Context::with_layer(sample::CLASSICAL);
    /// let outcome = analyzer.parse(ParseRequest::new("gateti", "phrase"), &ctx, &Options::default()).unwrap();
    /// let tree = outcome.tree().unwrap();
    /// assert_eq!(tree.best().unwrap().surface, "gateti");
    /// ```
    pub fn parse(
        &self,
        request: ParseRequest<'_>,
        context: &Context,
        options: &Options,
    ) -> Result<ParseOutcome, EngineError> {
        let (candidates, _) = self.decompose(request, context, options)?;
        Ok(match candidates {
            Some(candidates) => ParseOutcome::Solved(SolutionTree::build(candidates, options.debug_mode)),
            None => ParseOutcome::Cancelled,
        })
    }

    /// Like [`parse`](Self::parse), with timing and counters.
    pub fn parse_verbose(
        &self,
        request: ParseRequest<'_>,
        context: &Context,
        options: &Options,
    ) -> Result<ParseReport, EngineError> {
        let total_start = Instant::now();
        let (candidates, counters) = self.decompose(request, context, options)?;
        let decompose = total_start.elapsed();

        let build_start = Instant::now();
        let produced = candidates.as_ref().map(|c| c.iter().map(Candidate::size).sum()).unwrap_or(0);
        let outcome = match candidates {
            Some(candidates) => ParseOutcome::Solved(SolutionTree::build(candidates, options.debug_mode)),
            None => ParseOutcome::Cancelled,
        };
        let build = build_start.elapsed();

        let metrics = RunMetrics {
            total: total_start.elapsed(),
            decompose,
            build,
            descents: counters.descents,
            max_depth: counters.max_depth,
            candidates: produced,
            cache: self.manager.stats(),
        };
        Ok(ParseReport { entry: request.entry.to_string(), outcome, metrics })
    }

    fn decompose(
        &self,
        request: ParseRequest<'_>,
        context: &Context,
        options: &Options,
    ) -> Result<(Option<Vec<Candidate>>, ParseCounters), EngineError> {
        if request.entry.is_empty() {
            return Err(EngineError::EmptyEntry);
        }
        let ratio = options.freq_rating_ratio;
        if !ratio.is_finite() || ratio < 0.0 {
            return Err(EngineError::InvalidRatio(ratio));
        }

        let parser = Parser::new(
            &self.manager,
            self.lexicon.as_ref(),
            &self.ratings,
            &context.layer,
            &context.cancellation,
            context.progress.as_deref(),
            options.debug_mode,
            ratio,
        );
        let result = self.pool.install(|| parser.run(request.entry, request.label, request.parameters));
        let counters = parser.counters();

        match result {
            Ok(candidates) => {
                tracing::debug!(
                    entry = request.entry,
                    label = request.label,
                    alternatives = candidates.len(),
                    descents = counters.descents,
                    max_depth = counters.max_depth,
                    "parse finished"
                );
                Ok((Some(candidates), counters))
            }
            // Sibling branches race; once the token is set, a failure from
            // another branch must not mask the cancellation.
            Err(Interrupt::Failed(err)) if !context.cancellation.is_cancelled() => Err(err),
            Err(_) => {
                tracing::debug!(entry = request.entry, descents = counters.descents, "parse cancelled");
                Ok((None, counters))
            }
        }
    }
}
