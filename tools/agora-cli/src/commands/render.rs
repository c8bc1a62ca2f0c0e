//! Incremental terminal rendering of session snapshots.

use agora_core::{Message, Role, SessionSnapshot};
use console::style;
use std::{fmt::Display, io::Write};

/// Prints only what changed since the previous snapshot.
///
/// Messages are append-only and a streaming message only grows at the end,
/// so the renderer tracks how many messages were fully printed and how many
/// bytes of the live tail message are already on screen.
#[derive(Debug, Default)]
pub struct Renderer {
    printed: usize,
    open: Option<usize>,
    round: u32,
    typing: Vec<String>,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(
        &mut self,
        snapshot: &SessionSnapshot,
        out: &mut impl Write,
    ) -> std::io::Result<()> {
        if self.open.is_none() {
            self.render_round(snapshot, out)?;
        }

        let total = snapshot.messages.len();
        while self.printed < total {
            let message = &snapshot.messages[self.printed];
            let live = message.streaming && self.printed + 1 == total;

            match self.open {
                Some(shown) => {
                    let rest = message.content.get(shown..).unwrap_or_default();
                    write!(out, "{}", paint(message, rest))?;
                }
                None => write_message(message, out)?,
            }

            if live {
                self.open = Some(message.content.len());
                break;
            }
            writeln!(out)?;
            self.open = None;
            self.printed += 1;
        }

        if self.open.is_none() {
            self.render_typing(snapshot, out)?;
        }
        out.flush()
    }

    fn render_round(
        &mut self,
        snapshot: &SessionSnapshot,
        out: &mut impl Write,
    ) -> std::io::Result<()> {
        if snapshot.current_round == self.round {
            return Ok(());
        }
        self.round = snapshot.current_round;
        if self.round == 0 {
            return Ok(());
        }

        let banner = match snapshot.total_rounds {
            Some(total) => format!("── Round {}/{} ──", self.round, total),
            None => format!("── Round {} ──", self.round),
        };
        writeln!(out, "{}", style(banner).bold().magenta())
    }

    fn render_typing(
        &mut self,
        snapshot: &SessionSnapshot,
        out: &mut impl Write,
    ) -> std::io::Result<()> {
        for agent in &snapshot.typing_agents {
            if !self.typing.contains(agent) {
                let line = format!("{} is thinking...", agent);
                writeln!(out, "{}", style(line).dim().italic())?;
            }
        }
        self.typing.clone_from(&snapshot.typing_agents);
        Ok(())
    }
}

fn write_message(message: &Message, out: &mut impl Write) -> std::io::Result<()> {
    match message.role {
        Role::System => {}
        Role::User => write!(out, "{} ", style("You:").bold().blue())?,
        Role::Assistant => {
            let name = message.agent_name.as_deref().unwrap_or("Assistant");
            let header = format!("{}:", name);
            if message.is_summary() {
                write!(out, "{} ", style(header).bold().yellow())?;
            } else {
                write!(out, "{} ", style(header).bold().cyan())?;
            }
        }
    }
    write!(out, "{}", paint(message, &message.content))
}

fn paint<'a>(message: &Message, text: &'a str) -> impl Display + 'a {
    let styled = style(text);
    match message.role {
        Role::System => styled.dim(),
        Role::Assistant if message.is_summary() => styled.yellow(),
        _ => styled,
    }
}
