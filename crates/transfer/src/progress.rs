/// A raw bytes-sent measurement published by the upload body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferProgress {
    /// Bytes handed to the connection so far.
    pub sent: u64,
    /// Total body size, when known.
    pub total: Option<u64>,
}

impl TransferProgress {
    /// Creates a measurement of `sent` out of `total` bytes.
    pub fn new(sent: u64, total: Option<u64>) -> Self {
        Self { sent, total }
    }

    /// Integer completion percentage, rounded half-up and clamped to 0-100.
    ///
    /// Returns `None` when the total is unknown or zero, in which case the
    /// measurement is not computable.
    pub fn percent(&self) -> Option<u8> {
        let total = self.total.filter(|t| *t > 0)?;
        let sent = u128::from(self.sent);
        let total = u128::from(total);
        // floor(sent * 100 / total + 0.5) without floating point.
        let pct = (sent * 200 + total) / (total * 2);
        Some(pct.min(100) as u8)
    }

    /// Returns `true` once every byte has been handed over.
    pub fn is_complete(&self) -> bool {
        matches!(self.total, Some(total) if self.sent >= total)
    }
}
