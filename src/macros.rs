/// Compile a fixed pattern once and hand out a `&'static Regex`.
///
/// Accepts any `&'static str` expression so patterns can be assembled with
/// `concat!` from the shared fragments below.
#[macro_export]
macro_rules! regex {
    ($pat:expr) => {{
        static RE: once_cell::sync::Lazy<regex::Regex> =
            once_cell::sync::Lazy::new(|| regex::Regex::new($pat).unwrap());
        &*RE
    }};
}

/// Staple carbohydrate terms, as a capturing alternation.
#[macro_export]
macro_rules! carb_terms {
    () => {
        "(공기밥|쌀밥|밥|국수|라면|면|빵|떡|파스타|rice|noodles?|ramen|bread|buns?|pasta)"
    };
}
