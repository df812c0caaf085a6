pub mod quest_progress_entity;
pub mod waitlist_task_entity;
