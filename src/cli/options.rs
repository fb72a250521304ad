// Startup flag interpretation
//
// Deliberately permissive: unknown arguments are logged and ignored rather
// than rejected, so wrappers can pass through flags meant for other tools.

use tracing::debug;

use crate::config::Theme;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Startup {
    /// --help was given; print usage and exit without a session
    Help,
    Run(StartupOptions),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartupOptions {
    /// Theme selected on the command line, if any (last flag wins)
    pub theme: Option<Theme>,

    /// Arguments that were not recognised
    pub ignored: Vec<String>,
}

impl StartupOptions {
    pub fn parse<I, S>(args: I) -> Startup
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut options = StartupOptions::default();
        let mut help = false;

        for arg in args {
            let arg = arg.as_ref();
            if arg == "--help" {
                help = true;
            } else if let Some(theme) = Theme::from_flag(arg) {
                options.theme = Some(theme);
            } else {
                debug!(arg, "Ignoring unrecognised startup argument");
                options.ignored.push(arg.to_string());
            }
        }

        if help {
            Startup::Help
        } else {
            Startup::Run(options)
        }
    }

    /// Command-line theme, else the configured one
    pub fn theme_or(&self, configured: Theme) -> Theme {
        self.theme.unwrap_or(configured)
    }
}

pub fn help_text() -> String {
    r#"Help for plconsole
Available startup options:
--help
   Display this help text.
--theme-light
   Run with a light background and dark text.
--theme-dark
   Run with a dark background and light text.
"#
    .to_string()
}
