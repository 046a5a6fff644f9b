//! # Shell Completion Module
//!
//! Plain completion scripts come from clap. The enhanced bash and fish
//! scripts also complete `enigma recommend <track> --genre <genre>` from the
//! catalog, calling the hidden `complete-songs` command while you type.
//!
//! ```bash
//! enigma completion zsh > ~/.config/zsh/completions/_enigma
//! enigma completion-enhanced bash > ~/.local/share/bash-completion/completions/enigma
//! enigma completion-enhanced fish > ~/.config/fish/completions/enigma.fish
//! ```

use crate::catalog::Catalog;
use crate::song::Song;
use anyhow::{bail, Result};
use clap::Command;
use clap_complete::{generate, Generator, Shell as CompletionShell};
use std::collections::BTreeSet;
use std::io::{self, Write};
use std::path::Path;

/// Write the completion script for `cmd` to `out`.
pub fn generate_completions<G: Generator>(gen: G, cmd: &mut Command, out: &mut dyn Write) {
    let name = cmd.get_name().to_string();
    generate(gen, cmd, name, out);
}

const ENHANCED_BASH: &str = r#"# Enhanced enigma completion with catalog track names and genres
# Install with: enigma completion-enhanced bash > ~/.local/share/bash-completion/completions/enigma

_enigma_complete_songs() {
    if command -v enigma >/dev/null 2>&1; then
        enigma complete-songs 2>/dev/null
    fi
}

_enigma() {
    local cur prev words cword
    _init_completion || return

    case "${prev}" in
        recommend|--genre)
            local IFS=$'\n'
            COMPREPLY=($(compgen -W "$(_enigma_complete_songs)" -- "${cur}"))
            return 0
            ;;
        completion)
            COMPREPLY=($(compgen -W "bash zsh fish power-shell elvish" -- "${cur}"))
            return 0
            ;;
        completion-enhanced)
            COMPREPLY=($(compgen -W "bash fish" -- "${cur}"))
            return 0
            ;;
        import|--config|--db)
            _filedir
            return 0
            ;;
    esac

    local subcommands="import genres recommend run completion completion-enhanced help"

    if [[ $cword -eq 1 ]]; then
        COMPREPLY=($(compgen -W "$subcommands --config --db --help --version" -- "${cur}"))
    else
        case "${words[1]}" in
            import)
                COMPREPLY=($(compgen -W "--replace --help" -- "${cur}"))
                ;;
            recommend)
                COMPREPLY=($(compgen -W "--artist --genre --count -n --help" -- "${cur}"))
                ;;
            run)
                COMPREPLY=($(compgen -W "--user --voice-channel --channel --help" -- "${cur}"))
                ;;
            *)
                COMPREPLY=($(compgen -W "$subcommands" -- "${cur}"))
                ;;
        esac
    fi
} &&
complete -F _enigma enigma

# ex: filetype=sh"#;

const ENHANCED_FISH: &str = r#"# Enhanced enigma completion for fish with catalog track names and genres
# Install with: enigma completion-enhanced fish > ~/.config/fish/completions/enigma.fish

function __enigma_complete_songs
    if command -sq enigma
        enigma complete-songs --shell fish 2>/dev/null
    end
end

complete -c enigma -e

complete -c enigma -s h -l help -d 'Print help'
complete -c enigma -s V -l version -d 'Print version'
complete -c enigma -l config -r -F -d 'Settings file (JSON)'
complete -c enigma -l db -r -F -d 'Catalog database'

complete -c enigma -f -n '__fish_use_subcommand' -a 'import' -d 'Import songs from a CSV file'
complete -c enigma -f -n '__fish_use_subcommand' -a 'genres' -d 'List genres with their song counts'
complete -c enigma -f -n '__fish_use_subcommand' -a 'recommend' -d 'Print recommendations for a single song'
complete -c enigma -f -n '__fish_use_subcommand' -a 'run' -d 'Run the bot against the console'
complete -c enigma -f -n '__fish_use_subcommand' -a 'completion' -d 'Generate shell completions'
complete -c enigma -f -n '__fish_use_subcommand' -a 'completion-enhanced' -d 'Generate enhanced shell completions'

complete -c enigma -n '__fish_seen_subcommand_from import' -F -d 'CSV file'
complete -c enigma -f -n '__fish_seen_subcommand_from import' -l replace -d 'Drop the existing catalog first'

complete -c enigma -f -n '__fish_seen_subcommand_from recommend' -a '(__enigma_complete_songs)' -d 'Track name'
complete -c enigma -f -n '__fish_seen_subcommand_from recommend' -l genre -r -a '(__enigma_complete_songs)' -d 'Genre'
complete -c enigma -f -n '__fish_seen_subcommand_from recommend' -l artist -r -d 'Artist of the song'
complete -c enigma -f -n '__fish_seen_subcommand_from recommend' -s n -l count -r -d 'Maximum number of recommendations'

complete -c enigma -f -n '__fish_seen_subcommand_from run' -l user -r -d 'Name to post messages as'
complete -c enigma -f -n '__fish_seen_subcommand_from run' -l voice-channel -r -d 'Voice channel to start in'
complete -c enigma -f -n '__fish_seen_subcommand_from run' -l channel -r -d 'Text channel to post in'

complete -c enigma -f -n '__fish_seen_subcommand_from completion' -a 'bash zsh fish power-shell elvish'
complete -c enigma -f -n '__fish_seen_subcommand_from completion-enhanced' -a 'bash fish'"#;

/// Write the catalog-aware completion script for `shell` to `out`.
pub fn generate_enhanced_completion(shell: crate::cli::Shell, out: &mut dyn Write) -> Result<()> {
    let script = match shell {
        crate::cli::Shell::Bash => ENHANCED_BASH,
        crate::cli::Shell::Fish => ENHANCED_FISH,
        other => bail!("Enhanced completions only support bash and fish, not {other:?}"),
    };
    writeln!(out, "{script}")?;
    Ok(())
}

pub fn shell_to_completion_shell(shell: crate::cli::Shell) -> CompletionShell {
    match shell {
        crate::cli::Shell::Bash => CompletionShell::Bash,
        crate::cli::Shell::Zsh => CompletionShell::Zsh,
        crate::cli::Shell::Fish => CompletionShell::Fish,
        crate::cli::Shell::PowerShell => CompletionShell::PowerShell,
        crate::cli::Shell::Elvish => CompletionShell::Elvish,
    }
}

/// Distinct track names and genres, sorted.
#[must_use]
pub fn song_completions(songs: &[Song]) -> Vec<String> {
    songs
        .iter()
        .flat_map(|song| std::iter::once(song.track_name.clone()).chain(song.genre.clone()))
        .filter(|value| !value.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Print completions from the catalog at `db_path`, one per line.
///
/// A missing or unreadable catalog prints nothing: completion must never
/// break the user's shell.
pub fn print_song_completions(db_path: &Path, shell: Option<&str>) -> Result<()> {
    if !db_path.exists() {
        return Ok(());
    }
    let songs = match Catalog::open(db_path).and_then(|catalog| catalog.songs()) {
        Ok(songs) => songs,
        Err(err) => {
            log::debug!("No completions: {err:#}");
            return Ok(());
        }
    };

    let mut stdout = io::stdout().lock();
    for completion in song_completions(&songs) {
        match shell {
            // fish escapes on its own
            Some("fish") => writeln!(stdout, "{completion}")?,
            _ if completion.contains(char::is_whitespace) => {
                writeln!(stdout, "\"{}\"", completion.replace('"', "\\\""))?;
            }
            _ => writeln!(stdout, "{completion}")?,
        }
    }
    Ok(())
}
