use std::path::Path;

use tracing_subscriber::prelude::*;

fn main() -> miette::Result<()> {
    setup_miette();
    setup_tracing();

    turbo_config::emit(Path::new(turbo_config::DEFAULT_PATH))?;
    eprintln!("Created {}", turbo_config::DEFAULT_PATH);
    Ok(())
}

fn setup_miette() {
    let theme = if std::io::IsTerminal::is_terminal(&std::io::stderr()) {
        miette::GraphicalTheme::unicode()
    } else {
        miette::GraphicalTheme::unicode_nocolor()
    };
    miette::set_hook(Box::new(move |_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .graphical_theme(theme.clone())
                .build(),
        )
    }))
    .ok();
}

/// Logging is off unless `TURBO_CONFIG_LOG` holds a filter such as `debug`.
fn setup_tracing() {
    if let Ok(filter) = tracing_subscriber::EnvFilter::try_from_env("TURBO_CONFIG_LOG") {
        tracing_subscriber::registry()
            .with(
                tracing_tree::HierarchicalLayer::new(2)
                    .with_targets(true)
                    .with_bracketed_fields(true)
                    .with_indent_lines(true)
                    .with_timer(tracing_tree::time::Uptime::default())
                    .with_writer(std::io::stderr),
            )
            .with(filter)
            .init();
    }
}
