use core::fmt::Debug;

/// Key of one agent's per-agent planning state (published plans, replanning
/// bookkeeping).
///
/// Ordered so per-agent state iterates reproducibly across runs. `trace_id`
/// is the number stamped into the `a` field of per-agent trace events.
pub trait AgentId: Copy + Ord + Debug + Send + Sync + 'static {
    fn trace_id(self) -> u64;
}

macro_rules! unsigned_agent_id {
    ($($ty:ty),*) => {
        $(
            impl AgentId for $ty {
                fn trace_id(self) -> u64 {
                    self as u64
                }
            }
        )*
    };
}

unsigned_agent_id!(u8, u16, u32, u64, usize);
