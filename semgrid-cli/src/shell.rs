//! Interactive workbench session.
//!
//! A line-oriented shell over [`Workbench`]: entries are added and edited by
//! 1-based position, embeddings are generated through the loaded pipeline,
//! and the matrix is rendered on demand. Command errors are reported and the
//! session continues; only `quit` (or end of input) ends it.

use std::io::Write as _;

use tokio::io::{AsyncBufReadExt, BufReader};

use semgrid::render::{HighlightPolicy, entry_label};
use semgrid::workbench::{EntryState, Workbench};

use crate::error::Result;
use crate::table::render_matrix;

/// A parsed shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Empty,
    Help,
    Load,
    Add(String),
    Edit(usize, String),
    Del(usize),
    Show(usize),
    List,
    Embed(Option<usize>),
    Matrix,
    Status,
    Quit,
}

/// Parse a 1-based entry reference (`3` or `#3`) into a 0-based index.
fn parse_index(token: &str) -> std::result::Result<usize, String> {
    let digits = token.strip_prefix('#').unwrap_or(token);
    match digits.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(format!("'{token}' is not an entry number (use 1, 2, … or #1, #2, …)")),
    }
}

/// Parse one input line.
fn parse_command(line: &str) -> std::result::Result<Command, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Command::Empty);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((w, r)) => (w, r.trim()),
        None => (line, ""),
    };

    match word {
        "help" | "?" => Ok(Command::Help),
        "load" => Ok(Command::Load),
        "add" => {
            if rest.is_empty() {
                Err("usage: add <sentence>".to_owned())
            } else {
                Ok(Command::Add(rest.to_owned()))
            }
        }
        "edit" => match rest.split_once(char::is_whitespace) {
            Some((index, text)) if !text.trim().is_empty() => {
                Ok(Command::Edit(parse_index(index)?, text.trim().to_owned()))
            }
            _ => Err("usage: edit <n> <sentence>".to_owned()),
        },
        "del" | "rm" => {
            if rest.is_empty() {
                Err("usage: del <n>".to_owned())
            } else {
                Ok(Command::Del(parse_index(rest)?))
            }
        }
        "show" => {
            if rest.is_empty() {
                Err("usage: show <n>".to_owned())
            } else {
                Ok(Command::Show(parse_index(rest)?))
            }
        }
        "list" | "ls" => Ok(Command::List),
        "embed" => {
            if rest.is_empty() {
                Ok(Command::Embed(None))
            } else {
                Ok(Command::Embed(Some(parse_index(rest)?)))
            }
        }
        "matrix" | "calc" => Ok(Command::Matrix),
        "status" => Ok(Command::Status),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        other => Err(format!("unknown command '{other}' (try 'help')")),
    }
}

/// Interactive session state.
pub struct Shell {
    workbench: Workbench,
    policy: HighlightPolicy,
    precision: usize,
}

impl Shell {
    /// Create a shell over the given workbench and display settings.
    #[must_use]
    pub const fn new(workbench: Workbench, policy: HighlightPolicy, precision: usize) -> Self {
        Self {
            workbench,
            policy,
            precision,
        }
    }

    /// Run the interactive loop until `quit` or end of input.
    pub async fn run(&mut self) -> Result<()> {
        println!("semgrid shell | type 'help' for commands, 'quit' to leave\n");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            print!("semgrid> ");
            std::io::stdout().flush()?;

            let Some(line) = lines.next_line().await? else {
                break;
            };

            match parse_command(&line) {
                Ok(Command::Quit) => break,
                Ok(command) => self.execute(command).await,
                Err(usage) => println!("{usage}"),
            }
        }

        Ok(())
    }

    async fn execute(&mut self, command: Command) {
        match command {
            Command::Empty => {}
            Command::Help => Self::print_help(),
            Command::Load => self.cmd_load().await,
            Command::Add(text) => self.cmd_add(text).await,
            Command::Edit(index, text) => self.cmd_edit(index, text).await,
            Command::Del(index) => self.cmd_del(index),
            Command::Show(index) => self.cmd_show(index),
            Command::List => self.cmd_list(),
            Command::Embed(index) => self.cmd_embed(index).await,
            Command::Matrix => self.cmd_matrix(),
            Command::Status => self.cmd_status(),
            // Quit is handled by the loop.
            Command::Quit => {}
        }
    }

    fn print_help() {
        println!("Commands:");
        println!("  load              load the embedding model");
        println!("  add <sentence>    add an entry (embeds it if the model is loaded)");
        println!("  edit <n> <text>   replace entry n's text");
        println!("  del <n>           remove entry n");
        println!("  list              list entries and their embedding state");
        println!("  show <n>          print entry n's embedding vector");
        println!("  embed [n]         embed entry n, or every entry missing one");
        println!("  matrix            compute and print the similarity matrix");
        println!("  status            pipeline and session state");
        println!("  quit              leave the shell");
    }

    async fn cmd_load(&mut self) {
        if self.workbench.pipeline().is_ready() {
            println!("model already loaded");
            return;
        }
        println!("loading {}...", self.workbench.pipeline().model());
        match self.workbench.load().await {
            Ok(()) => println!(
                "ready: {} ({} dimensions)",
                self.workbench.pipeline().model(),
                self.workbench.pipeline().dimension().unwrap_or(0)
            ),
            Err(e) => println!("load failed: {e}"),
        }
    }

    async fn cmd_add(&mut self, text: String) {
        let index = self.workbench.add_entry(text);
        println!("added {}", entry_label(index));

        if self.workbench.pipeline().is_ready() {
            if let Err(e) = self.workbench.embed_entry(index).await {
                println!("embedding failed: {e}");
            }
        } else {
            println!("model not loaded; run 'load' then 'embed'");
        }
    }

    async fn cmd_edit(&mut self, index: usize, text: String) {
        if let Err(e) = self.workbench.set_text(index, text) {
            println!("{e}");
            return;
        }
        if self.workbench.pipeline().is_ready() {
            if let Err(e) = self.workbench.embed_entry(index).await {
                println!("embedding failed: {e}");
            }
        }
    }

    fn cmd_del(&mut self, index: usize) {
        match self.workbench.remove_entry(index) {
            Ok(()) => println!("removed {}", entry_label(index)),
            Err(e) => println!("{e}"),
        }
    }

    fn cmd_show(&self, index: usize) {
        match self.workbench.entry(index) {
            Some(entry) => {
                println!("{} {}", entry_label(index), entry.text());
                match entry.state() {
                    EntryState::Embedded(embedding) => {
                        match serde_json::to_string(&embedding.vector) {
                            Ok(json) => println!("{json}"),
                            Err(e) => println!("error: {e}"),
                        }
                    }
                    EntryState::Pending => println!("(generating)"),
                    EntryState::Empty => println!("(no embedding)"),
                }
            }
            None => println!("no entry {}", entry_label(index)),
        }
    }

    fn cmd_list(&self) {
        if self.workbench.is_empty() {
            println!("no entries; use 'add <sentence>'");
            return;
        }
        for (index, entry) in self.workbench.entries().iter().enumerate() {
            let state = match entry.state() {
                EntryState::Empty => "-".to_owned(),
                EntryState::Pending => "...".to_owned(),
                EntryState::Embedded(embedding) => format!("{}d", embedding.dimension()),
            };
            println!("{:>4} [{state:>5}] {}", entry_label(index), entry.text());
        }
    }

    async fn cmd_embed(&mut self, index: Option<usize>) {
        let result = match index {
            Some(index) => self.workbench.embed_entry(index).await,
            None => self.workbench.embed_all().await,
        };
        match result {
            Ok(()) => println!("done"),
            Err(e) => println!("embedding failed: {e}"),
        }
    }

    fn cmd_matrix(&mut self) {
        if self.workbench.len() < 2 {
            println!("need at least two entries");
            return;
        }
        if !self.workbench.can_compute() {
            let missing: Vec<String> = self
                .workbench
                .entries()
                .iter()
                .enumerate()
                .filter(|(_, e)| !e.is_embedded())
                .map(|(i, _)| entry_label(i))
                .collect();
            println!("not all entries are embedded yet: {}", missing.join(", "));
            return;
        }

        match self.workbench.compute() {
            Ok(matrix) => {
                let rendered = render_matrix(matrix, &self.policy, self.precision);
                print!("{rendered}");
            }
            Err(e) => println!("{e}"),
        }
    }

    fn cmd_status(&self) {
        let pipeline = self.workbench.pipeline();
        println!("model:     {}", pipeline.model());
        println!("state:     {}", pipeline.state());
        if let Some(dimension) = pipeline.dimension() {
            println!("dimension: {dimension}");
        }
        if let Some(error) = pipeline.last_error() {
            println!("error:     {error}");
        }
        println!("entries:   {}", self.workbench.len());
        println!(
            "matrix:    {}",
            if self.workbench.matrix().is_some() {
                "computed"
            } else if self.workbench.can_compute() {
                "ready to compute"
            } else {
                "not ready"
            }
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod parsing {
        use super::*;

        #[test]
        fn empty_line_is_noop() {
            assert_eq!(parse_command("").unwrap(), Command::Empty);
            assert_eq!(parse_command("   ").unwrap(), Command::Empty);
        }

        #[test]
        fn simple_commands() {
            assert_eq!(parse_command("help").unwrap(), Command::Help);
            assert_eq!(parse_command("?").unwrap(), Command::Help);
            assert_eq!(parse_command("load").unwrap(), Command::Load);
            assert_eq!(parse_command("list").unwrap(), Command::List);
            assert_eq!(parse_command("ls").unwrap(), Command::List);
            assert_eq!(parse_command("matrix").unwrap(), Command::Matrix);
            assert_eq!(parse_command("calc").unwrap(), Command::Matrix);
            assert_eq!(parse_command("status").unwrap(), Command::Status);
            assert_eq!(parse_command("quit").unwrap(), Command::Quit);
            assert_eq!(parse_command("exit").unwrap(), Command::Quit);
        }

        #[test]
        fn add_keeps_full_sentence() {
            assert_eq!(
                parse_command("add The cat sat on the mat.").unwrap(),
                Command::Add("The cat sat on the mat.".to_owned())
            );
        }

        #[test]
        fn add_without_text_is_usage_error() {
            assert!(parse_command("add").is_err());
            assert!(parse_command("add   ").is_err());
        }

        #[test]
        fn edit_takes_index_and_text() {
            assert_eq!(
                parse_command("edit 2 a new sentence").unwrap(),
                Command::Edit(1, "a new sentence".to_owned())
            );
        }

        #[test]
        fn edit_without_text_is_usage_error() {
            assert!(parse_command("edit 2").is_err());
        }

        #[test]
        fn del_and_rm_parse_index() {
            assert_eq!(parse_command("del 1").unwrap(), Command::Del(0));
            assert_eq!(parse_command("rm #3").unwrap(), Command::Del(2));
        }

        #[test]
        fn embed_with_and_without_index() {
            assert_eq!(parse_command("embed").unwrap(), Command::Embed(None));
            assert_eq!(parse_command("embed 2").unwrap(), Command::Embed(Some(1)));
        }

        #[test]
        fn show_parses_index() {
            assert_eq!(parse_command("show #1").unwrap(), Command::Show(0));
        }

        #[test]
        fn unknown_command_is_error() {
            let err = parse_command("frobnicate").unwrap_err();
            assert!(err.contains("frobnicate"));
        }
    }

    mod indexes {
        use super::*;

        #[test]
        fn one_based_to_zero_based() {
            assert_eq!(parse_index("1").unwrap(), 0);
            assert_eq!(parse_index("10").unwrap(), 9);
        }

        #[test]
        fn hash_prefix_accepted() {
            assert_eq!(parse_index("#2").unwrap(), 1);
        }

        #[test]
        fn zero_and_garbage_rejected() {
            assert!(parse_index("0").is_err());
            assert!(parse_index("-1").is_err());
            assert!(parse_index("two").is_err());
        }
    }
}
