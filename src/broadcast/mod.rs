mod scheduler;

pub use scheduler::BroadcastScheduler;
