/// Delivery status of one asynchronous operation.
///
/// `Incomplete` is the only non-terminal state; every other state is
/// absorbing once a collector adopts it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Status {
    #[default]
    Incomplete,
    Finished,
    Cancelled,
    NoInternet,
    NoLocationData,
    Unknown,
}

impl Status {
    pub fn is_terminal(self) -> bool {
        self != Status::Incomplete
    }

    /// Terminal and reporting a problem the UI should surface.
    pub fn is_error(self) -> bool {
        matches!(
            self,
            Status::NoInternet | Status::NoLocationData | Status::Unknown
        )
    }
}

/// How the backend ended an operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CompletionStatus {
    #[default]
    Ok,
    Cancelled,
    Error,
}

/// Diagnostic code attached to a completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationInfo {
    NoInternet,
    NoLocationData,
    Unknown,
    /// A code this shell does not interpret.
    Other(u32),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionDetails {
    pub status: CompletionStatus,
    pub info: Vec<OperationInfo>,
}

impl CompletionDetails {
    pub fn new(status: CompletionStatus) -> Self {
        Self {
            status,
            info: Vec::new(),
        }
    }

    pub fn with_info(mut self, info: OperationInfo) -> Self {
        self.info.push(info);
        self
    }

    /// Maps to the terminal status the collector adopts.
    ///
    /// Priority: no internet, no location data, unknown, cancelled, finished.
    /// A plain error without diagnostics counts as finished.
    pub fn to_status(&self) -> Status {
        let has = |code: OperationInfo| self.info.contains(&code);
        if has(OperationInfo::NoInternet) {
            Status::NoInternet
        } else if has(OperationInfo::NoLocationData) {
            Status::NoLocationData
        } else if has(OperationInfo::Unknown) {
            Status::Unknown
        } else if self.status == CompletionStatus::Cancelled {
            Status::Cancelled
        } else {
            Status::Finished
        }
    }
}

impl From<CompletionStatus> for CompletionDetails {
    fn from(status: CompletionStatus) -> Self {
        Self::new(status)
    }
}
