pub mod course;
pub mod topic;

pub use course::{Course, NewCourseRequest, UpdateCourseRequest};
pub use topic::{ExtractedTopic, NewTopicRequest, SaveTopicsRequest, Topic, UpdateTopicRequest};
