//! Plain-text rendering of the core's view model.

use std::fmt::Write;

use skycast_core::{
    RecoveryAction, ViewBody, ViewModel,
    view::{Daypart, ReadyView},
};

pub fn render(vm: &ViewModel) -> String {
    match &vm.body {
        ViewBody::Idle { prompt } => format!("{prompt}\n"),
        ViewBody::Loading { message } => format!("{message}\n"),
        ViewBody::Error { message, action, .. } => {
            format!("{message}\n{}\n", hint(*action))
        }
        ViewBody::Ready(view) => render_ready(view, vm.theme.mode.as_str()),
    }
}

fn hint(action: RecoveryAction) -> &'static str {
    match action {
        RecoveryAction::SearchForCity => "Try: skycast show <CITY>",
        RecoveryAction::TryAgain => "Try again in a moment.",
    }
}

fn render_ready(view: &ReadyView, theme: &str) -> String {
    let mut out = String::new();
    let daypart = match view.daypart {
        Daypart::Day => "day",
        Daypart::Evening => "evening",
    };

    let _ = writeln!(out, "{} | {} (feels like {})", view.title, view.temperature, view.feels_like);
    let _ = writeln!(out, "{}, low {} / high {}", view.description, view.low, view.high);

    let mut details = format!(
        "Humidity {}   Pressure {}   Wind {}",
        view.humidity, view.pressure, view.wind
    );
    if let Some(visibility) = &view.visibility {
        let _ = write!(details, "   Visibility {visibility}");
    }
    let _ = writeln!(out, "{details}");
    let _ = writeln!(
        out,
        "Sunrise {}   Sunset {}   ({daypart}, {theme} theme)",
        view.sunrise, view.sunset
    );

    if !view.forecast.is_empty() {
        let _ = writeln!(out, "\nNext hours:");
        for row in &view.forecast {
            let _ = writeln!(out, "  {}  {:>6}  {}", row.time, row.temperature, row.condition);
        }
    }

    out
}
