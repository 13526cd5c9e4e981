//! Interactive play session over stdin/stdout.

use quiz_core::markup::{card_view, html_to_text};
use quiz_core::{
    Card, ChoiceState, Deck, DeckEvent, Outcome, QuizPage, RenderEnv, Widget, WidgetEvent,
};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

pub const HELP: &str = "\
Commands:
  list            list decks and cards on the page
  focus N         switch to item N from `list`
  select N        pick option N of a multiple-choice card
  answer TEXT     type TEXT into a numeric card
  check           check the current answer
  show            show the solution
  reset           start the card over
  next / prev     move through a deck
  help            show this text
  quit            leave";

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    /// 1-based item number from `list`.
    Focus(usize),
    /// 1-based option number.
    Select(usize),
    Answer(String),
    Check,
    Show,
    Reset,
    Next,
    Prev,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command {0:?}, type `help` for a list")]
    Unknown(String),

    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),

    #[error("expected a number from 1 up, got {0:?}")]
    InvalidNumber(String),
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let line = line.trim();
        let (name, arg) = match line.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (line, ""),
        };

        match name.to_ascii_lowercase().as_str() {
            "" => Err(CommandError::Empty),
            "list" | "ls" => Ok(Self::List),
            "focus" => ordinal(arg, "focus").map(Self::Focus),
            "select" => ordinal(arg, "select").map(Self::Select),
            "answer" if arg.is_empty() => Err(CommandError::MissingArgument("answer")),
            "answer" => Ok(Self::Answer(arg.to_string())),
            "check" => Ok(Self::Check),
            "show" | "reveal" => Ok(Self::Show),
            "reset" => Ok(Self::Reset),
            "next" | "n" => Ok(Self::Next),
            "prev" | "p" => Ok(Self::Prev),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }

    /// The card-level event this command stands for, if any.
    fn widget_event(&self) -> Option<WidgetEvent> {
        match self {
            Self::Select(n) => n.checked_sub(1).map(WidgetEvent::Select),
            Self::Answer(text) => Some(WidgetEvent::Input(text.clone())),
            Self::Check => Some(WidgetEvent::Check),
            Self::Show => Some(WidgetEvent::Reveal),
            Self::Reset => Some(WidgetEvent::Reset),
            _ => None,
        }
    }
}

fn ordinal(arg: &str, command: &'static str) -> Result<usize, CommandError> {
    if arg.is_empty() {
        return Err(CommandError::MissingArgument(command));
    }
    arg.parse::<usize>()
        .ok()
        .filter(|n| *n >= 1)
        .ok_or_else(|| CommandError::InvalidNumber(arg.to_string()))
}

/// Item the commands act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Deck(usize),
    Card(usize),
}

pub struct Session {
    page: QuizPage,
    focus: Option<Focus>,
}

impl Session {
    pub fn new(page: QuizPage) -> Self {
        let mut session = Self { page, focus: None };
        session.focus = session.items().first().copied();
        session
    }

    pub fn page(&self) -> &QuizPage {
        &self.page
    }

    pub fn focus(&self) -> Option<Focus> {
        self.focus
    }

    /// Decks first, then standalone cards.
    pub fn items(&self) -> Vec<Focus> {
        (0..self.page.decks().len())
            .map(Focus::Deck)
            .chain((0..self.page.cards().len()).map(Focus::Card))
            .collect()
    }

    /// Apply one command. Returns the text to print, or `None` to quit.
    pub fn apply(&mut self, command: Command, env: &RenderEnv<'_>) -> Option<String> {
        let reply = match command {
            Command::Quit => return None,
            Command::Help => HELP.to_string(),
            Command::List => self.render_list(),
            Command::Focus(n) => {
                let item = n.checked_sub(1).and_then(|i| self.items().get(i).copied());
                match item {
                    Some(item) => {
                        self.focus = Some(item);
                        self.render()
                    }
                    None => format!("No item {n}; `list` shows what is on the page."),
                }
            }
            Command::Next | Command::Prev => match self.focus {
                Some(Focus::Deck(i)) => {
                    let event = if command == Command::Next {
                        DeckEvent::Next
                    } else {
                        DeckEvent::Previous
                    };
                    self.dispatch_deck(i, event, env);
                    self.render()
                }
                _ => "The focused item is not a deck.".to_string(),
            },
            other => {
                let Some(event) = other.widget_event() else {
                    return Some(self.render());
                };
                match self.focus {
                    Some(Focus::Deck(i)) => self.dispatch_deck(i, DeckEvent::Card(event), env),
                    Some(Focus::Card(i)) => {
                        if let Some(card) = self.page.cards_mut().get_mut(i) {
                            if let Err(e) = card.handle(event, env) {
                                tracing::debug!(error = %e, "card event rejected");
                            }
                        }
                    }
                    None => {}
                }
                self.render()
            }
        };
        Some(reply)
    }

    fn dispatch_deck(&mut self, index: usize, event: DeckEvent, env: &RenderEnv<'_>) {
        if let Some(deck) = self.page.decks_mut().get_mut(index) {
            if let Err(e) = deck.handle(event, env) {
                tracing::debug!(error = %e, "deck event rejected");
            }
        }
    }

    /// Text view of the focused item.
    pub fn render(&self) -> String {
        match self.focus {
            Some(Focus::Deck(i)) => match self.page.decks().get(i) {
                Some(deck) => render_deck(i, deck),
                None => String::new(),
            },
            Some(Focus::Card(i)) => match self.page.cards().get(i) {
                Some(card) => format!("Card {}\n{}", i + 1, render_card(card)),
                None => String::new(),
            },
            None => "No quizzes found on this page.".to_string(),
        }
    }

    fn render_list(&self) -> String {
        let items = self.items();
        if items.is_empty() {
            return "No quizzes found on this page.".to_string();
        }

        items
            .iter()
            .enumerate()
            .map(|(n, item)| {
                let marker = if Some(*item) == self.focus { '*' } else { ' ' };
                let summary = match *item {
                    Focus::Deck(i) => self.page.decks().get(i).map(|deck| {
                        let status = deck
                            .progress_label()
                            .or_else(|| deck.status_text().map(str::to_string))
                            .unwrap_or_default();
                        format!("deck {}: {status}", i + 1)
                    }),
                    Focus::Card(i) => self
                        .page
                        .cards()
                        .get(i)
                        .map(|card| format!("card: {}", card_view(card.html()).prompt)),
                };
                format!("{marker}{}) {}", n + 1, summary.unwrap_or_default())
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn render_deck(index: usize, deck: &Deck) -> String {
    let header = match (deck.progress_label(), deck.status_text()) {
        (Some(label), _) => format!("Deck {}: {label}", index + 1),
        (None, Some(status)) => format!("Deck {}: {status}", index + 1),
        (None, None) => format!("Deck {}", index + 1),
    };
    match deck.current() {
        Some(card) => format!("{header}\n{}", render_card(card)),
        None => header,
    }
}

fn render_card(card: &Card) -> String {
    let Some(widget) = card.widget() else {
        return match card.inert_reason() {
            Some(reason) => format!("  (inactive: {reason})"),
            None => "  (inactive)".to_string(),
        };
    };

    let view = card_view(card.html());
    let mut lines = vec![format!("  {}", view.prompt)];

    match widget {
        Widget::Mcq(mcq) => {
            for (n, (label, choice)) in view.choices.iter().zip(mcq.choices()).enumerate() {
                let marker = match choice.state {
                    ChoiceState::Neutral => "",
                    ChoiceState::Selected => " [selected]",
                    ChoiceState::Correct => " [correct]",
                    ChoiceState::Wrong => " [wrong]",
                };
                lines.push(format!("    {}) {label}{marker}", n + 1));
            }
        }
        Widget::Numeric(numeric) => {
            lines.push(format!("    answer: {}", numeric.input()));
        }
    }

    let feedback = widget.feedback();
    let tag = match feedback.outcome() {
        Outcome::Pass => "[ok] ",
        Outcome::Fail => "[bad] ",
        Outcome::Neutral => "",
    };
    lines.push(format!("  {tag}{}", html_to_text(feedback.html())));
    lines.join("\n")
}

/// Read commands until `quit` or end of input.
pub async fn run<R, W>(
    session: &mut Session,
    input: R,
    mut output: W,
    env: &RenderEnv<'_>,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    output.write_all(session.render().as_bytes()).await?;
    output.write_all(b"\n> ").await?;
    output.flush().await?;

    while let Some(line) = lines.next_line().await? {
        let reply = match Command::parse(&line) {
            Ok(command) => match session.apply(command, env) {
                Some(reply) => reply,
                None => break,
            },
            Err(CommandError::Empty) => String::new(),
            Err(e) => e.to_string(),
        };
        if !reply.is_empty() {
            output.write_all(reply.as_bytes()).await?;
            output.write_all(b"\n").await?;
        }
        output.write_all(b"> ").await?;
        output.flush().await?;
    }
    Ok(())
}
