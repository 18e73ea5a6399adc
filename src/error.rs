//! Global error handling utilities
use tracing::error;

/// Install color-eyre and a panic hook that logs through tracing.
///
/// Called once at startup before anything else can fail.
pub fn install_error_handlers() -> color_eyre::Result<()> {
    color_eyre::install()?;

    std::panic::set_hook(Box::new(|panic_info| {
        if let Some(location) = panic_info.location() {
            error!(
                message = %panic_info,
                panic.file = location.file(),
                panic.line = location.line(),
                "Application panic"
            );
        } else {
            error!(message = %panic_info, "Application panic");
        }

        eprintln!("The application panicked! This is a bug and should be reported.");
        if let Some(location) = panic_info.location() {
            eprintln!(
                "Panic occurred at {}:{}:{}",
                location.file(),
                location.line(),
                location.column()
            );
        }
    }));

    Ok(())
}
