use value_mappr::{LookupDetails, StageMetrics, Value};

/// ANSI styling keyed by what is being printed rather than by color.
mod style {
    const RESET: &str = "\x1b[0m";

    #[derive(Clone, Copy)]
    pub enum Role {
        Heading,
        Key,
        Stage,
        Value,
        Missing,
        Warning,
        Muted,
    }

    impl Role {
        fn code(self) -> &'static str {
            match self {
                Role::Heading => "\x1b[90m",
                Role::Key => "\x1b[36m",
                Role::Stage => "\x1b[34m",
                Role::Value => "\x1b[1;32m",
                Role::Missing => "\x1b[31m",
                Role::Warning => "\x1b[33m",
                Role::Muted => "\x1b[2m",
            }
        }
    }

    pub struct Palette {
        enabled: bool,
    }

    impl Palette {
        pub fn new(enabled: bool) -> Self {
            Self { enabled }
        }

        pub fn paint(&self, s: impl AsRef<str>, role: Role) -> String {
            if self.enabled { format!("{}{}{}", role.code(), s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn dim(&self, s: impl AsRef<str>) -> String {
            self.paint(s, Role::Muted)
        }
    }
}

use style::{Palette, Role};

pub fn print_run(pipeline: Vec<&str>, lookups: &[LookupDetails], color: bool) {
    let palette = Palette::new(color);

    println!("\n{}", palette.paint("━━━ Pipeline ━━━", Role::Heading));
    if pipeline.is_empty() {
        println!("  {}", palette.dim("(no stages: raw values are returned)"));
    } else {
        let stages: Vec<String> = pipeline.iter().map(|name| palette.paint(name, Role::Stage)).collect();
        println!("  {}", stages.join(palette.dim(" → ").as_str()));
    }

    println!("\n{}", palette.paint("━━━ Lookups ━━━", Role::Heading));
    if lookups.is_empty() {
        println!("{}", palette.dim("  Dictionary is empty"));
    }
    for details in lookups {
        print_lookup(details, &palette);
    }

    let unresolved = lookups.iter().filter(|d| !d.resolution.is_resolved()).count();
    let total: std::time::Duration = lookups.iter().map(|d| d.total).sum();

    println!("\n{}", palette.paint("━━━ Summary ━━━", Role::Heading));
    println!(
        "  Keys: {}  │  Unresolved: {}  │  Time: {}",
        palette.paint(lookups.len().to_string(), Role::Value),
        if unresolved > 0 {
            palette.paint(unresolved.to_string(), Role::Missing)
        } else {
            palette.dim(unresolved.to_string())
        },
        palette.dim(format!("{:?}", total)),
    );
    if unresolved > 0 {
        println!("\n{}", palette.dim("  Tip: Set VALUE_MAPPR_DEBUG=1 to trace every lookup hop"));
    }
    println!();
}

fn print_lookup(details: &LookupDetails, palette: &Palette) {
    let res = &details.resolution;
    let value = match &res.value {
        Some(v) => palette.paint(preview(v), Role::Value),
        None => palette.paint("<undefined>", Role::Missing),
    };

    println!("  {} {} {}", palette.paint(&details.key, Role::Key), palette.dim("=>"), value);
    println!(
        "      {} {}",
        palette.dim("raw:"),
        details.raw.as_ref().map(preview).unwrap_or_else(|| palette.dim("<absent>"))
    );

    if !res.aliases_used.is_empty() {
        println!("      {} {}", palette.dim("via:"), palette.paint(res.aliases_used.join(" → "), Role::Stage));
    }
    if !res.aliases_not_found.is_empty() {
        println!("      {} {}", palette.dim("not found:"), palette.paint(res.aliases_not_found.join(", "), Role::Warning));
    }
    for stage in details.stages.iter().filter(|s| s.changed) {
        println!("      {}", fmt_stage_compact(stage, palette));
    }
}

fn fmt_stage_compact(stage: &StageMetrics, palette: &Palette) -> String {
    format!(
        "{} {} {}",
        palette.paint(format!("[{}]", stage.stage), Role::Heading),
        palette.dim(format!("+{} used, +{} missing", stage.aliases_used, stage.aliases_not_found)),
        palette.dim(format!("{:?}", stage.duration))
    )
}

fn preview(value: &Value) -> String {
    value.to_string().chars().take(80).collect()
}
