use game_types::TransitionEvent;

/// Letters the reveal cycles through: the Spanish alphabet, Ñ included.
pub const SPANISH_ALPHABET: [char; 27] = [
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'Ñ', 'O', 'P', 'Q', 'R',
    'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealPhase {
    Idle,
    Spinning,
    Settled,
}

/// Identifies one logical spin. Ticks and settles carrying an outdated token
/// are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpinToken(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealCompletion {
    pub round_number: Option<u32>,
    /// `None` when an optimistic spin settled before the authority confirmed
    /// a letter.
    pub letter: Option<char>,
    pub ticks: u32,
}

/// Timer-free state of the letter reveal animation.
///
/// The driver owns the clock: it calls `begin`, then `tick` on every interval
/// and `settle` once the spin duration elapsed. `settle` succeeds at most once
/// per token, which is what guarantees a single completion per spin.
#[derive(Debug, Clone)]
pub struct RevealMachine {
    alphabet: Vec<char>,
    phase: RevealPhase,
    display: char,
    settled_letter: Option<char>,
    spin_index: usize,
    current_spin: u64,
    target: Option<char>,
    round_number: Option<u32>,
    ticks: u32,
}

impl Default for RevealMachine {
    fn default() -> Self {
        Self::new(SPANISH_ALPHABET.to_vec())
    }
}

impl RevealMachine {
    /// An empty alphabet falls back to the Spanish one.
    pub fn new(alphabet: Vec<char>) -> Self {
        let alphabet = if alphabet.is_empty() {
            SPANISH_ALPHABET.to_vec()
        } else {
            alphabet
        };
        let display = alphabet[0];

        Self {
            alphabet,
            phase: RevealPhase::Idle,
            display,
            settled_letter: None,
            spin_index: 0,
            current_spin: 0,
            target: None,
            round_number: None,
            ticks: 0,
        }
    }

    pub fn phase(&self) -> RevealPhase {
        self.phase
    }

    pub fn display_letter(&self) -> char {
        self.display
    }

    pub fn alphabet(&self) -> &[char] {
        &self.alphabet
    }

    /// Start (or restart) a spin toward `letter`. Any earlier spin is
    /// superseded and can no longer tick or settle.
    pub fn begin(&mut self, letter: Option<char>, round_number: Option<u32>) -> SpinToken {
        self.current_spin += 1;
        self.phase = RevealPhase::Spinning;
        self.target = letter;
        self.round_number = round_number;
        self.ticks = 0;
        SpinToken(self.current_spin)
    }

    pub fn begin_transition(&mut self, event: &TransitionEvent) -> SpinToken {
        self.begin(Some(event.letter), Some(event.round_number))
    }

    /// Advance the displayed letter. Returns the new letter, or `None` when
    /// the token is outdated or the machine is not spinning.
    pub fn tick(&mut self, token: SpinToken) -> Option<char> {
        if !self.is_current(token) {
            return None;
        }

        self.spin_index = (self.spin_index + 1) % self.alphabet.len();
        self.display = self.alphabet[self.spin_index];
        self.ticks += 1;
        Some(self.display)
    }

    /// Lock the display to the target letter and report completion, once.
    pub fn settle(&mut self, token: SpinToken) -> Option<RevealCompletion> {
        if !self.is_current(token) {
            return None;
        }

        self.phase = RevealPhase::Settled;
        if let Some(letter) = self.target {
            self.settled_letter = Some(letter);
        }
        if let Some(letter) = self.settled_letter {
            self.display = letter;
        }

        Some(RevealCompletion {
            round_number: self.round_number,
            letter: self.target,
            ticks: self.ticks,
        })
    }

    /// Abort a spin without completing it.
    pub fn cancel(&mut self) {
        if self.phase == RevealPhase::Spinning {
            self.current_spin += 1;
            self.phase = RevealPhase::Idle;
            if let Some(letter) = self.settled_letter {
                self.display = letter;
            }
        }
    }

    /// Show a polled letter directly. Ignored while spinning.
    pub fn show(&mut self, letter: char) {
        if self.phase != RevealPhase::Spinning {
            self.display = letter;
            self.settled_letter = Some(letter);
        }
    }

    /// Invalidate every outstanding token and return to `Idle`.
    pub fn reset(&mut self) {
        self.current_spin += 1;
        self.phase = RevealPhase::Idle;
    }

    /// Whether no spin was started, cancelled or reset since `token`.
    pub fn is_latest(&self, token: SpinToken) -> bool {
        token.0 == self.current_spin
    }

    fn is_current(&self, token: SpinToken) -> bool {
        self.phase == RevealPhase::Spinning && token.0 == self.current_spin
    }
}
