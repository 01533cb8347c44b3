//! Parser State Machine
//!
//! A deliberately small subset of the VT100 model, matching what BBS-era
//! ANSI art actually uses. The parser handles arbitrary chunk boundaries:
//! a sequence split across two bursts resumes where it left off.
//!
//! # State Machine
//!
//! - Ground: printable bytes and C0 controls
//! - Escape: after ESC, waiting for `[`
//! - CsiParam: collecting parameter bytes until a final byte (0x40-0x7E)
//! - Trailer: after SUB (0x1A), collecting metadata strings
//!
//! An ESC that is not followed by `[` is not an error: both bytes are
//! printed literally and the parser returns to Ground.

use super::action::{Action, ControlCode, CsiAction, MAX_PARAM_BYTES};
use crate::codepage;

const ESC: u8 = 0x1B;
const SUB: u8 = 0x1A;

/// Parser state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Ground,
    Escape,
    CsiParam,
    Trailer,
}

/// The ANSI art parser
#[derive(Debug)]
pub struct Parser {
    state: State,
    /// Parameter bytes of the CSI sequence being collected
    params: Vec<u8>,
    /// Pending metadata string after end-of-text
    trailer: Vec<u8>,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    /// Create a new parser in the ground state
    pub fn new() -> Self {
        Self {
            state: State::Ground,
            params: Vec::with_capacity(16),
            trailer: Vec::new(),
        }
    }

    /// Reset the parser to initial state
    pub fn reset(&mut self) {
        self.state = State::Ground;
        self.params.clear();
        self.trailer.clear();
    }

    /// Whether the end-of-text marker has been seen
    pub fn in_trailer(&self) -> bool {
        self.state == State::Trailer
    }

    /// Process a chunk of bytes, returning actions
    pub fn parse(&mut self, data: &[u8]) -> Vec<Action> {
        let mut actions = Vec::with_capacity(data.len());
        for &byte in data {
            self.advance(byte, &mut |action| actions.push(action));
        }
        actions
    }

    /// Flush a metadata string left unterminated at the end of the stream
    pub fn finish(&mut self) -> Option<Action> {
        self.take_metadata()
    }

    /// Process a single byte, handing any resulting actions to `sink`
    pub fn advance<F: FnMut(Action)>(&mut self, byte: u8, sink: &mut F) {
        match self.state {
            State::Ground => self.process_ground(byte, sink),
            State::Escape => self.process_escape(byte, sink),
            State::CsiParam => self.process_csi_param(byte, sink),
            State::Trailer => self.process_trailer(byte, sink),
        }
    }

    fn process_ground<F: FnMut(Action)>(&mut self, byte: u8, sink: &mut F) {
        if let Some(control) = ControlCode::from_byte(byte) {
            sink(Action::Control(control));
            return;
        }
        match byte {
            SUB => {
                self.state = State::Trailer;
                sink(Action::EndOfText);
            }
            ESC => {
                self.state = State::Escape;
            }
            _ => sink(Action::Print(byte)),
        }
    }

    fn process_escape<F: FnMut(Action)>(&mut self, byte: u8, sink: &mut F) {
        if byte == b'[' {
            self.params.clear();
            self.state = State::CsiParam;
        } else {
            // Not a CSI: show what we got
            sink(Action::Print(ESC));
            sink(Action::Print(byte));
            self.state = State::Ground;
        }
    }

    fn process_csi_param<F: FnMut(Action)>(&mut self, byte: u8, sink: &mut F) {
        if (0x40..=0x7E).contains(&byte) {
            self.state = State::Ground;
            sink(Action::Csi(CsiAction::new(&self.params, byte)));
            self.params.clear();
        } else if self.params.len() < MAX_PARAM_BYTES {
            self.params.push(byte);
        }
    }

    fn process_trailer<F: FnMut(Action)>(&mut self, byte: u8, sink: &mut F) {
        if byte == 0x00 || byte == SUB {
            if let Some(action) = self.take_metadata() {
                sink(action);
            }
        } else {
            self.trailer.push(byte);
        }
    }

    fn take_metadata(&mut self) -> Option<Action> {
        if self.trailer.is_empty() {
            return None;
        }
        let text = codepage::decode(&self.trailer);
        self.trailer.clear();
        Some(Action::Metadata(text))
    }
}
