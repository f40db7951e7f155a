use ketoscore::{Category, Menu, ScoreExplanation};

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

pub fn print_explanation(menu: &Menu, ex: &ScoreExplanation, color: bool) {
    let palette = ansi::Palette::new(color);
    println!("\n{}", palette.bold(palette.paint(format!("⚙  Scoring: \"{}\"", menu.name), ansi::CYAN)));
    if let Some(description) = &menu.description {
        println!("   {}", palette.dim(description));
    }

    if let Some(error) = &ex.error {
        println!("\n{}", palette.paint("━━━ Error ━━━", ansi::GRAY));
        println!("  {}", palette.paint(error, ansi::RED));
    }

    println!("\n{}", palette.paint("━━━ Matches ━━━", ansi::GRAY));
    if ex.matches.is_empty() {
        println!("{}", palette.dim("  No dictionary terms found"));
    } else {
        print_matches(ex, &palette);
    }

    if !ex.substitutions.is_empty() || !ex.negations.is_empty() {
        println!("\n{}", palette.paint("━━━ Substitutions / Negations ━━━", ansi::GRAY));
        for sub in &ex.substitutions {
            println!(
                "  {} {} → {}  {}",
                palette.paint(format!("@{}", sub.position), ansi::YELLOW),
                palette.paint(&sub.original, ansi::RED),
                palette.paint(&sub.substitute, ansi::GREEN),
                palette.dim(format!("conf {:.2}", sub.confidence)),
            );
        }
        for neg in &ex.negations {
            let label = if neg.optional { "optional" } else { "excluded" };
            println!(
                "  {} {} {}  {}",
                palette.paint(format!("@{}", neg.position), ansi::YELLOW),
                palette.paint(&neg.carb, ansi::RED),
                palette.paint(label, ansi::BLUE),
                palette.dim(format!("\"{}\" conf {:.2}", neg.phrase, neg.confidence)),
            );
        }
    }

    println!("\n{}", palette.paint("━━━ Reasons ━━━", ansi::GRAY));
    if ex.score.reasons.is_empty() {
        println!("{}", palette.dim("  No adjustments"));
    }
    for reason in &ex.score.reasons {
        println!(
            "  {} {} {}  {}",
            palette.paint(fmt_impact(reason.impact), impact_color(reason.impact)),
            palette.paint(&reason.rule_id, ansi::BLUE),
            palette.dim("│"),
            reason.explanation,
        );
    }

    if !ex.rules.is_empty() {
        println!("\n{}", palette.paint("━━━ Standalone rule impact ━━━", ansi::GRAY));
        for trace in &ex.rules {
            let gate = trace.min_confidence.map(|g| format!("≥{g:.1}")).unwrap_or_else(|| "-".to_string());
            println!(
                "  {:<20} {}  {}",
                palette.paint(trace.rule_id, ansi::CYAN),
                palette.paint(fmt_impact(trace.standalone_impact), impact_color(trace.standalone_impact)),
                palette.dim(format!("gate {gate}, {} reasons", trace.reasons.len())),
            );
        }
    }

    println!("\n{}", palette.paint("━━━ Score ━━━", ansi::GRAY));
    println!(
        "  raw {}  │  final {}  │  confidence {}  │  {}",
        palette.paint(format!("{:.1}", ex.score.raw_score), ansi::YELLOW),
        palette.bold(format!("{:.1}", ex.score.final_score)),
        palette.paint(format!("{:.2}", ex.score.confidence), ansi::BLUE),
        palette.bold(palette.paint(ex.score.category.as_str(), category_color(ex.score.category))),
    );
    println!(
        "  {}",
        palette.dim(format!(
            "confidence = weighted {:.3} × 0.7 + count {:.3} × 0.3",
            ex.confidence.weighted, ex.confidence.count_factor
        ))
    );

    println!("\n{}", palette.paint("━━━ Timing ━━━", ansi::GRAY));
    println!(
        "  Total: {}  │  Matching: {}  │  Rules: {}  │  Post: {}",
        palette.paint(format!("{:?}", ex.metrics.total), ansi::GREEN),
        palette.paint(format!("{:?}", ex.metrics.matching), ansi::CYAN),
        palette.paint(format!("{:?}", ex.metrics.rules), ansi::CYAN),
        palette.dim(format!("{:?}", ex.metrics.post_processing)),
    );
    println!();
}

fn print_matches(ex: &ScoreExplanation, palette: &ansi::Palette) {
    for (idx, m) in ex.matches.iter().enumerate() {
        println!(
            "  {} {} {} {}",
            palette.paint(format!("[{}]", idx), ansi::GRAY),
            palette.bold(palette.paint(&m.keyword, impact_color(m.weight))),
            palette.dim("│"),
            palette.paint(format!("@{}", m.position), ansi::YELLOW),
        );
        println!(
            "      {} {}  {} {}  {} {}",
            palette.dim("kind:"),
            palette.paint(m.kind.as_str(), ansi::BLUE),
            palette.dim("│ weight:"),
            palette.paint(format!("{:+.1}", m.weight), impact_color(m.weight)),
            palette.dim("│ conf:"),
            palette.paint(format!("{:.2}", m.confidence), ansi::CYAN),
        );
    }
}

fn fmt_impact(impact: f64) -> String {
    format!("{impact:>+7.1}")
}

fn impact_color(value: f64) -> &'static str {
    if value > 0.0 {
        ansi::GREEN
    } else if value < 0.0 {
        ansi::RED
    } else {
        ansi::GRAY
    }
}

fn category_color(category: Category) -> &'static str {
    match category {
        Category::Recommended => ansi::GREEN,
        Category::Moderate => ansi::CYAN,
        Category::Caution => ansi::YELLOW,
        Category::Avoid => ansi::RED,
    }
}
