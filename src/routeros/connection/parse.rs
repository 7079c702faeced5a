// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! RouterOS reply sentence parser
//!
//! A finite state machine folded over the words of one sentence. Each control
//! word opens a block, the words after it are collected into that block until
//! the next control word:
//!
//! ```text
//! !re    =name=ether1  =running=true
//! !re    =name=ether2  =running=false
//! !done
//! ```
//!
//! gives two `!re` attribute blocks and an empty `!done` block. Valid
//! sentences follow `(!re | !trap)* (!done | !fatal)`.

use crate::error::ParseError;
use crate::routeros::types::{ABOUT, Attributes, ControlWord, ParsedReply};

/// Words collected for the current block
#[derive(Debug)]
enum Buffer {
    Attributes(Attributes),
    /// `!fatal` carries plain message fragments, not attributes
    Fragments(Vec<String>),
}

impl Buffer {
    fn for_block(word: ControlWord) -> Self {
        match word {
            ControlWord::Fatal => Self::Fragments(Vec::new()),
            _ => Self::Attributes(Attributes::new()),
        }
    }
}

#[derive(Debug)]
enum State {
    Starting,
    Block(ControlWord, Buffer),
    Final,
}

/// Target of a state transition
#[derive(Debug, Clone, Copy)]
enum Next {
    Block(ControlWord),
    Final,
}

/// Parser state threaded through the fold
#[derive(Debug)]
struct Parser {
    state: State,
    reply: ParsedReply,
}

impl Parser {
    fn new() -> Self {
        Self {
            state: State::Starting,
            reply: ParsedReply::default(),
        }
    }

    fn step(self, word: &str) -> Result<Self, ParseError> {
        match ControlWord::from_word(word) {
            Some(control) => self.enter(Next::Block(control)),
            None => self.feed(word),
        }
    }

    /// Switches block, storing the buffer of the block being left
    fn enter(mut self, next: Next) -> Result<Self, ParseError> {
        match std::mem::replace(&mut self.state, State::Starting) {
            State::Starting => {}
            State::Block(ControlWord::Re, Buffer::Attributes(attrs)) => {
                self.reply.re.get_or_insert_with(Vec::new).push(attrs);
            }
            State::Block(ControlWord::Trap, Buffer::Attributes(attrs)) => {
                self.reply.trap.get_or_insert_with(Vec::new).push(attrs);
            }
            State::Block(terminal, buffer) => match (next, buffer) {
                (Next::Final, Buffer::Attributes(attrs)) if terminal == ControlWord::Done => {
                    self.reply.done = Some(attrs);
                }
                (Next::Final, Buffer::Fragments(fragments)) => {
                    self.reply.fatal = Some(fragments);
                }
                (Next::Block(word), _) => {
                    return Err(ParseError::AfterTerminal(word.as_str().to_string()));
                }
                (Next::Final, _) => return Err(ParseError::Internal),
            },
            State::Final => return Err(ParseError::Internal),
        }
        self.state = match next {
            Next::Block(word) => State::Block(word, Buffer::for_block(word)),
            Next::Final => State::Final,
        };
        Ok(self)
    }

    /// Adds a non-control word to the current block
    fn feed(mut self, word: &str) -> Result<Self, ParseError> {
        match &mut self.state {
            State::Starting => return Err(ParseError::NotAReplyWord(word.to_string())),
            State::Block(_, Buffer::Fragments(fragments)) => fragments.push(word.to_string()),
            State::Block(_, Buffer::Attributes(attrs)) => add_attribute(attrs, word)?,
            State::Final => return Err(ParseError::Internal),
        }
        Ok(self)
    }

    fn finish(self) -> Result<ParsedReply, ParseError> {
        let terminal = match &self.state {
            State::Starting => return Err(ParseError::EmptyResponse),
            State::Block(word, _) => word.is_terminal(),
            State::Final => return Err(ParseError::Internal),
        };
        if !terminal {
            return Err(ParseError::MissingTerminal);
        }
        Ok(self.enter(Next::Final)?.reply)
    }
}

/// Parses `=name=value`, `=name=` or `=name` into the block attributes
fn add_attribute(attrs: &mut Attributes, word: &str) -> Result<(), ParseError> {
    let Some(rest) = word.strip_prefix('=') else {
        if word.starts_with(".tag") {
            return Err(ParseError::TaggedResponse);
        }
        return Err(ParseError::UnknownAttributeFormat(word.to_string()));
    };
    let (name, value) = rest.split_once('=').unwrap_or((rest, ""));
    if name.is_empty() {
        return Err(ParseError::InvalidAttribute(word.to_string()));
    }
    if name == ABOUT {
        attrs.push_about(value.to_string());
    } else if attrs
        .insert(name.to_string(), value.to_string())
        .is_some()
    {
        return Err(ParseError::DuplicateAttribute(name.to_string()));
    }
    Ok(())
}

/// Parses the words of one reply sentence (terminating empty word excluded)
///
/// # Errors
///
/// Returns a [`ParseError`] when the block sequence or an attribute word is
/// malformed.
pub fn parse_sentence<S: AsRef<str>>(words: &[S]) -> Result<ParsedReply, ParseError> {
    words
        .iter()
        .try_fold(Parser::new(), |parser, word| parser.step(word.as_ref()))?
        .finish()
}
