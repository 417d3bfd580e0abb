use std::time::Duration;

/// Handle to one scheduled deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

#[derive(Debug, Clone, Copy)]
struct Pending {
    ticket: Ticket,
    due_ns: u64,
}

/// A single pending deadline. Scheduling again replaces whatever was pending,
/// so at most one expiry is ever reported per schedule.
#[derive(Debug, Default)]
pub struct OneShot {
    pending: Option<Pending>,
    issued: u64,
}

impl OneShot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules expiry `delay` after `now_ns`, cancelling the previous deadline.
    pub fn schedule(&mut self, now_ns: u64, delay: Duration) -> Ticket {
        self.issued += 1;
        let ticket = Ticket(self.issued);
        let due_ns = now_ns.saturating_add(delay.as_nanos() as u64);
        self.pending = Some(Pending { ticket, due_ns });
        ticket
    }

    pub fn cancel(&mut self) -> Option<Ticket> {
        self.pending.take().map(|p| p.ticket)
    }

    /// Takes the pending deadline if it has expired at `now_ns`.
    pub fn take_due(&mut self, now_ns: u64) -> Option<Ticket> {
        match self.pending {
            Some(p) if now_ns >= p.due_ns => {
                self.pending = None;
                Some(p.ticket)
            }
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_ticket(&self) -> Option<Ticket> {
        self.pending.map(|p| p.ticket)
    }

    pub fn remaining(&self, now_ns: u64) -> Option<Duration> {
        self.pending
            .map(|p| Duration::from_nanos(p.due_ns.saturating_sub(now_ns)))
    }
}
