//! List the supported target languages.

use crate::translation::language::{self, LANGUAGES};

/// Prints the supported target language codes and names.
pub fn handle_languages() -> Result<(), anyhow::Error> {
    println!();
    println!(" ┏┓┓┏╋");
    println!(" ┗┛┗┛┗");
    println!();
    println!("Supported target languages:");
    println!();

    for lang in LANGUAGES {
        let default_marker = if lang.code == language::DEFAULT_CODE {
            " [DEFAULT]"
        } else {
            ""
        };
        println!("  {:<8} {}{}", lang.code, lang.name, default_marker);
    }

    println!();
    println!("Set target_lang in ~/.config/ovt/ovt.toml, or cycle with 'l' during a session.");

    Ok(())
}
