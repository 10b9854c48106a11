/// Control actions an observer can return while a system advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Stop advancing and keep the ticks simulated so far.
    StopEarly,
}
