/// Lazily compiled static regex for a literal pattern.
#[macro_export]
macro_rules! regex {
    ($pat:literal) => {{
        static RE: once_cell::sync::Lazy<regex::Regex> =
            once_cell::sync::Lazy::new(|| regex::Regex::new($pat).unwrap());
        &*RE
    }};
}

/// Sparse [`ParameterVector`](crate::ParameterVector) literal.
///
/// ```
/// use padaccheda::{params, ParameterVector};
///
/// let v = params![1 => 10, 2 => 20];
/// assert_eq!(v.get(1), Ok(10));
/// assert_eq!(params![], ParameterVector::wildcard());
/// ```
#[macro_export]
macro_rules! params {
    () => {
        $crate::ParameterVector::wildcard()
    };
    ($($pos:expr => $val:expr),+ $(,)?) => {{
        let mut bytes = [$crate::WILDCARD; $crate::PARAMETER_COUNT];
        $( bytes[$pos] = $val; )+
        $crate::ParameterVector::from(bytes)
    }};
}
