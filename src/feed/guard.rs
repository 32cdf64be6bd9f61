/// Identifies one admitted fetch.
///
/// `generation` changes on every reset, so a ticket from an earlier lifetime
/// can never release the guard of a later one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub generation: u64,
    pub seq: u64,
}

/// Single-flight gate with one coalesced re-trigger.
#[derive(Debug, Default)]
pub struct FetchGuard {
    generation: u64,
    next_seq: u64,
    in_flight: Option<Ticket>,
    pending_retrigger: bool,
}

impl FetchGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn has_pending(&self) -> bool {
        self.pending_retrigger
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Take the gate, or remember the request if it is already taken.
    pub fn try_acquire(&mut self) -> Option<Ticket> {
        if self.in_flight.is_some() {
            self.pending_retrigger = true;
            return None;
        }
        let ticket = Ticket {
            generation: self.generation,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.in_flight = Some(ticket);
        Some(ticket)
    }

    /// Release the gate held by `ticket`.
    ///
    /// Returns whether a coalesced re-trigger is owed, or `None` if the ticket
    /// is not the one in flight.
    pub fn release(&mut self, ticket: Ticket) -> Option<bool> {
        if self.in_flight != Some(ticket) {
            return None;
        }
        self.in_flight = None;
        Some(std::mem::take(&mut self.pending_retrigger))
    }

    pub fn reset(&mut self) {
        self.generation += 1;
        self.in_flight = None;
        self.pending_retrigger = false;
    }
}
