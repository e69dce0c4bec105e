//! homc-drv - Compiler Driver
//!
//! Orchestrates the pipeline:
//!
//! ```text
//! Source (.hom)
//!      │
//!      ▼
//!  [homc-lex]  ──▶ tokens          (--tokens stops here)
//!      │
//!      ▼
//!  [homc-par]  ──▶ AST             (--parse stops here)
//!      │
//!      ▼
//!  [homc-sem]  ──▶ validated AST   (--validate stops here)
//!      │
//!      ▼
//!  [homc-sem]  ──▶ typed AST
//!      │
//!      ▼
//!  [homc-ll]   ──▶ stack IR        (--ll stops here)
//!      │
//!      ▼
//!  [homc-gen]  ──▶ assembly on stdout
//! ```
//!
//! Control flow is strictly sequential: a pass that leaves errors in the
//! handler stops the pipeline, the accumulated report is rendered (warnings
//! first, then errors in source order), and the process exits non-zero.
//! `--flip-error-code` inverts the exit status for negative tests.

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{anyhow, Context};
use homc_util::span::SourceMap;
use homc_util::{render, Handler};
use thiserror::Error;

/// Which artifact to print before stopping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emit {
    /// Print the token stream and exit
    Tokens,
    /// Print the AST and exit
    Ast,
    /// Run the validator and exit
    Validate,
    /// Print the lowered IR and exit
    Ll,
    /// Print the emitted assembly (the default)
    Asm,
}

/// Driver configuration, parsed from the command line.
#[derive(Debug, Clone)]
pub struct Config {
    pub input: PathBuf,
    pub emit: Emit,
    pub flip_error_code: bool,
}

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("unknown flag `{0}`")]
    UnknownFlag(String),

    #[error("more than one input file given")]
    MultipleInputs,

    #[error("no input file given\nusage: homc <file> [--tokens | --parse | --validate | --ll] [--flip-error-code]")]
    NoInput,
}

impl Config {
    /// Parse command-line arguments. Flags are order-independent.
    pub fn from_args(args: &[String]) -> Result<Config, CompileError> {
        let mut input = None;
        let mut emit = Emit::Asm;
        let mut flip_error_code = false;

        for arg in args {
            match arg.as_str() {
                "--tokens" => emit = Emit::Tokens,
                "--parse" => emit = Emit::Ast,
                "--validate" => emit = Emit::Validate,
                "--ll" => emit = Emit::Ll,
                "--flip-error-code" => flip_error_code = true,
                flag if flag.starts_with("--") => {
                    return Err(CompileError::UnknownFlag(flag.to_string()))
                }
                path => {
                    if input.replace(PathBuf::from(path)).is_some() {
                        return Err(CompileError::MultipleInputs);
                    }
                }
            }
        }

        Ok(Config {
            input: input.ok_or(CompileError::NoInput)?,
            emit,
            flip_error_code,
        })
    }
}

/// The output of one compiler run.
pub struct RunOutput {
    /// Artifact text for stdout
    pub stdout: String,
    /// Rendered diagnostic report for stderr
    pub report: String,
    /// Process exit code (already flipped when requested)
    pub exit_code: i32,
}

/// Run the pipeline for the configured input file.
pub fn run(config: &Config) -> anyhow::Result<RunOutput> {
    let text = std::fs::read_to_string(&config.input)
        .with_context(|| format!("could not read `{}`", config.input.display()))?;

    let mut sources = SourceMap::new();
    let file_id = sources.add_file(config.input.display().to_string(), text);
    let file = sources
        .get(file_id)
        .ok_or_else(|| anyhow!("source file vanished from the source map"))?;

    let handler = Handler::new();
    let mut stdout = String::new();

    let tokens = homc_lex::lex(&file);
    if config.emit == Emit::Tokens {
        for token in &tokens {
            writeln!(stdout, "{:?}", token)?;
        }
        return Ok(finish(config, stdout, &handler, &sources));
    }

    let Some(program) = homc_par::parse(&tokens, &handler) else {
        return Ok(finish(config, stdout, &handler, &sources));
    };
    if config.emit == Emit::Ast {
        writeln!(stdout, "{:#?}", program)?;
        return Ok(finish(config, stdout, &handler, &sources));
    }

    homc_sem::validate(&program, &handler);
    if config.emit == Emit::Validate || handler.has_errors() {
        return Ok(finish(config, stdout, &handler, &sources));
    }

    let ctx = homc_sem::check(&program, &handler);
    if handler.has_errors() {
        return Ok(finish(config, stdout, &handler, &sources));
    }

    let lowered = homc_ll::lower(&program, &ctx).context("lowering failed")?;
    if config.emit == Emit::Ll {
        writeln!(stdout, "{}", lowered)?;
        return Ok(finish(config, stdout, &handler, &sources));
    }

    let asm = homc_gen::emit_program(&lowered).context("assembly emission failed")?;
    stdout.push_str(&asm);
    Ok(finish(config, stdout, &handler, &sources))
}

fn finish(config: &Config, stdout: String, handler: &Handler, sources: &SourceMap) -> RunOutput {
    let report = render::render_report(handler, sources);
    let mut exit_code = if handler.has_errors() { 1 } else { 0 };
    if config.flip_error_code {
        exit_code = if exit_code == 0 { 1 } else { 0 };
    }
    RunOutput {
        stdout,
        report,
        exit_code,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_default_config() {
        let config = Config::from_args(&args(&["main.hom"])).unwrap();
        assert_eq!(config.input, PathBuf::from("main.hom"));
        assert_eq!(config.emit, Emit::Asm);
        assert!(!config.flip_error_code);
    }

    #[test]
    fn test_flags_order_independent() {
        let config = Config::from_args(&args(&["--flip-error-code", "main.hom", "--ll"])).unwrap();
        assert_eq!(config.emit, Emit::Ll);
        assert!(config.flip_error_code);

        let config = Config::from_args(&args(&["main.hom", "--tokens"])).unwrap();
        assert_eq!(config.emit, Emit::Tokens);
    }

    #[test]
    fn test_missing_input_rejected() {
        assert!(matches!(
            Config::from_args(&args(&["--ll"])),
            Err(CompileError::NoInput)
        ));
    }

    #[test]
    fn test_unknown_flag_rejected() {
        assert!(matches!(
            Config::from_args(&args(&["main.hom", "--wat"])),
            Err(CompileError::UnknownFlag(_))
        ));
    }

    #[test]
    fn test_multiple_inputs_rejected() {
        assert!(matches!(
            Config::from_args(&args(&["a.hom", "b.hom"])),
            Err(CompileError::MultipleInputs)
        ));
    }
}
