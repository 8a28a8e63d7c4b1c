use std::path::PathBuf;

use crate::config;

pub fn load_settings() -> config::Settings {
    let mut settings = match config::Settings::load() {
        Ok(s) => {
            if let Err(msg) = s.validate() {
                eprintln!("vivace: invalid config, using defaults: {msg}");
                config::Settings::default()
            } else {
                s
            }
        }
        Err(e) => {
            // Config is optional; failures should not prevent the app from starting.
            eprintln!("vivace: failed to load config, using defaults: {e}");
            config::Settings::default()
        }
    };
    apply_root_override(&mut settings, std::env::args().nth(1));
    settings
}

/// A positional directory argument (`vivace ~/other-music`) wins over the
/// configured library root for this run.
fn apply_root_override(settings: &mut config::Settings, arg: Option<String>) {
    if let Some(dir) = arg {
        settings.library.root = Some(PathBuf::from(dir));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_positional_argument_overrides_the_configured_root() {
        let mut settings = config::Settings::default();
        settings.library.root = Some("/srv/music".into());

        apply_root_override(&mut settings, Some("/mnt/usb".into()));
        assert_eq!(settings.library.root, Some(PathBuf::from("/mnt/usb")));
    }

    #[test]
    fn no_argument_leaves_the_configured_root_alone() {
        let mut settings = config::Settings::default();
        settings.library.root = Some("/srv/music".into());

        apply_root_override(&mut settings, None);
        assert_eq!(settings.library.root, Some(PathBuf::from("/srv/music")));
    }
}
