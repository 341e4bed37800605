//! User-facing and model-facing fixed messages.

/// Stand-in tool output when the user refuses a gated call.
pub const PERMISSION_DENIED: &str = "User denied permission to execute this command.";

/// Reported when a shell command succeeds without producing any output.
pub const SHELL_NO_OUTPUT: &str = "Command executed successfully (no output).";

/// Welcome line shown by the front-end at startup.
pub const WELCOME: &str =
    "Type 'exit' to quit. The agent will ask for approval before running shell commands.";

/// Notice shown while a turn is in flight.
pub const TURN_IN_FLIGHT: &str = "The agent is still working, please wait...";
