use colored::*;
use similar::TextDiff;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use dir_merge_core::index::FileRecord;
use dir_merge_core::merge::{ResolutionDecision, ResolutionPolicy, ResolutionRequest, Resolver};
use dir_merge_core::Error;

/// Larger files are listed without a diff.
const DIFF_SIZE_LIMIT: u64 = 64 * 1024;

/// Asks on `output` and reads the answer from `input` for every group.
pub struct InteractiveResolver<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> InteractiveResolver<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn show(&mut self, request: &ResolutionRequest<'_>) -> io::Result<()> {
        writeln!(self.output)?;
        writeln!(
            self.output,
            "{} {}",
            request.kind.as_str().yellow().bold(),
            request.key
        )?;
        let hint = match request.policy {
            ResolutionPolicy::ChooseVersion => "These files differ: choose the version to keep.",
            ResolutionPolicy::ChooseLocations => "These files are identical: choose where to keep them.",
        };
        writeln!(self.output, "{}", hint)?;
        for (i, record) in request.members.iter().enumerate() {
            writeln!(
                self.output,
                "  [{}] {} ({}, {} bytes) in {}",
                i,
                record.name,
                record.rel_path.display(),
                record.size,
                request.roots[record.root].display()
            )?;
        }
        if request.policy == ResolutionPolicy::ChooseVersion {
            if let Some((base, others)) = request.members.split_first() {
                for (i, other) in others.iter().enumerate() {
                    match unified_diff(base, other, i + 1) {
                        Some(diff) => write!(self.output, "{}", diff)?,
                        None => writeln!(self.output, "  (no text diff for [{}])", i + 1)?,
                    }
                }
            }
        }
        Ok(())
    }
}

fn read_text(record: &FileRecord) -> Option<String> {
    if record.size > DIFF_SIZE_LIMIT {
        return None;
    }
    fs::read_to_string(&record.abs_path).ok()
}

/// Unified diff of member `position` against member 0, or `None` unless both
/// are small UTF-8 files.
fn unified_diff(base: &FileRecord, other: &FileRecord, position: usize) -> Option<String> {
    let old = read_text(base)?;
    let new = read_text(other)?;
    let old_label = format!("[0] {}", base.rel_path.display());
    let new_label = format!("[{}] {}", position, other.rel_path.display());
    let diff = TextDiff::from_lines(&old, &new)
        .unified_diff()
        .context_radius(3)
        .header(&old_label, &new_label)
        .to_string();
    Some(diff)
}

impl<R: BufRead, W: Write> Resolver for InteractiveResolver<R, W> {
    fn resolve(&mut self, request: &ResolutionRequest<'_>) -> Result<ResolutionDecision, Error> {
        self.show(request)?;
        let members = request.members.len();
        let mut line = String::new();
        loop {
            write!(
                self.output,
                "Keep which? (N, N,M, a = all, d = drop all): "
            )?;
            self.output.flush()?;

            line.clear();
            if self.input.read_line(&mut line)? == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "input closed while resolving a group",
                )
                .into());
            }
            match parse_choice(&line, members) {
                Some(decision) => return Ok(decision),
                None => writeln!(self.output, "Enter a number from 0 to {}.", members - 1)?,
            }
        }
    }
}

/// Parse a reply to the group prompt. Indices must be below `members`.
pub fn parse_choice(input: &str, members: usize) -> Option<ResolutionDecision> {
    let input = input.trim();
    match input.to_lowercase().as_str() {
        "" => return None,
        "a" => return Some(ResolutionDecision::KeepAll),
        "d" => return Some(ResolutionDecision::DeleteAll),
        _ => {}
    }

    let mut indices = Vec::new();
    for part in input.split(',') {
        let index: usize = part.trim().parse().ok()?;
        if index >= members {
            return None;
        }
        if !indices.contains(&index) {
            indices.push(index);
        }
    }
    match indices.as_slice() {
        [only] => Some(ResolutionDecision::KeepOne(*only)),
        _ => Some(ResolutionDecision::KeepSome(indices)),
    }
}

/// Read directories, one per line, until an empty line.
pub fn prompt_roots() -> io::Result<Vec<PathBuf>> {
    println!("No directories given. Enter one per line, then an empty line:");
    let stdin = io::stdin();
    let mut roots = Vec::new();
    let mut line = String::new();
    loop {
        print!("> ");
        io::stdout().flush()?;
        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let dir = line.trim();
        if dir.is_empty() {
            break;
        }
        roots.push(PathBuf::from(dir));
    }
    Ok(roots)
}

pub fn prompt_confirm(prompt: &str, default: Option<bool>) -> io::Result<bool> {
    let mut input = String::new();

    loop {
        input.clear();

        match default {
            Some(true) => print!("{} (Y/n): ", prompt),
            Some(false) | None => print!("{} (y/N): ", prompt),
        }
        io::stdout().flush()?;

        if io::stdin().read_line(&mut input)? == 0 {
            return Ok(default.unwrap_or(false));
        }

        match input.trim().to_uppercase().as_str() {
            "Y" => return Ok(true),
            "N" => return Ok(false),
            "" => match default {
                Some(default) => return Ok(default),
                None => continue,
            },
            _ => continue,
        }
    }
}
