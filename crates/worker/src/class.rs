/// Execution classes used for scheduling and observability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskClass {
	/// Latency-sensitive work driven by pointer or document events.
	Interactive,
	/// Async work whose result may be discarded, such as provider fetches.
	Background,
	/// The dedicated job dispatcher thread.
	Dispatcher,
}

impl TaskClass {
	pub(crate) const fn as_str(self) -> &'static str {
		match self {
			Self::Interactive => "interactive",
			Self::Background => "background",
			Self::Dispatcher => "dispatcher",
		}
	}
}
