use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::{
    Course, ExtractedTopic, NewCourseRequest, NewTopicRequest, Topic, UpdateCourseRequest,
    UpdateTopicRequest,
};

const COURSE_COLUMNS: &str = "id, user_id, name, end_date, description, syllabus_ref, topics_extracted, created_at, updated_at";
const TOPIC_COLUMNS: &str = "id, course_id, title, content, order_index, created_at";

pub async fn fetch_courses(db: &SqlitePool, user_id: &str) -> Result<Vec<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!(
        "SELECT {} FROM courses WHERE user_id = ? ORDER BY created_at DESC, rowid DESC",
        COURSE_COLUMNS
    ))
    .bind(user_id)
    .fetch_all(db)
    .await
}

pub async fn find_course_by_id(db: &SqlitePool, id: &str) -> Result<Option<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!("SELECT {} FROM courses WHERE id = ?", COURSE_COLUMNS))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn insert_course(
    db: &SqlitePool,
    user_id: &str,
    req: NewCourseRequest,
) -> Result<Course, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO courses
            (id, user_id, name, end_date, description, syllabus_ref,
            topics_extracted, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7, ?7)
        "#,
    )
    .bind(&id)
    .bind(user_id)
    .bind(&req.name)
    .bind(req.end_date)
    .bind(&req.description)
    .bind(&req.syllabus_ref)
    .bind(&now)
    .execute(db)
    .await?;

    Ok(Course {
        id,
        user_id: user_id.to_string(),
        name: req.name,
        end_date: req.end_date,
        description: req.description,
        syllabus_ref: req.syllabus_ref,
        topics_extracted: false,
        created_at: now.clone(),
        updated_at: now,
    })
}

pub async fn update_course(
    db: &SqlitePool,
    id: &str,
    req: UpdateCourseRequest,
) -> Result<Option<Course>, sqlx::Error> {
    let mut current = match find_course_by_id(db, id).await? {
        Some(c) => c,
        None => return Ok(None),
    };

    if let Some(name) = req.name {
        current.name = name;
    }
    if let Some(end_date) = req.end_date {
        current.end_date = end_date;
    }
    if let Some(description) = req.description {
        current.description = description;
    }
    if let Some(syllabus_ref) = req.syllabus_ref {
        current.syllabus_ref = syllabus_ref;
    }
    current.updated_at = Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        UPDATE courses
        SET name = ?1,
            end_date = ?2,
            description = ?3,
            syllabus_ref = ?4,
            updated_at = ?5
        WHERE id = ?6
        "#,
    )
    .bind(&current.name)
    .bind(current.end_date)
    .bind(&current.description)
    .bind(&current.syllabus_ref)
    .bind(&current.updated_at)
    .bind(id)
    .execute(db)
    .await?;

    Ok(Some(current))
}

/// Deletes the course and its topics in one transaction.
pub async fn delete_course(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let mut tx = db.begin().await?;

    sqlx::query("DELETE FROM topics WHERE course_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    let deleted = sqlx::query("DELETE FROM courses WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    tx.commit().await?;
    Ok(deleted > 0)
}

pub async fn fetch_topics(db: &SqlitePool, course_id: &str) -> Result<Vec<Topic>, sqlx::Error> {
    sqlx::query_as::<_, Topic>(&format!(
        "SELECT {} FROM topics WHERE course_id = ? ORDER BY order_index ASC",
        TOPIC_COLUMNS
    ))
    .bind(course_id)
    .fetch_all(db)
    .await
}

pub async fn find_topic(
    db: &SqlitePool,
    course_id: &str,
    topic_id: &str,
) -> Result<Option<Topic>, sqlx::Error> {
    sqlx::query_as::<_, Topic>(&format!(
        "SELECT {} FROM topics WHERE id = ? AND course_id = ?",
        TOPIC_COLUMNS
    ))
    .bind(topic_id)
    .bind(course_id)
    .fetch_optional(db)
    .await
}

/// Appends a topic after the current last one.
pub async fn insert_topic(
    db: &SqlitePool,
    course_id: &str,
    req: NewTopicRequest,
) -> Result<Topic, sqlx::Error> {
    let mut tx = db.begin().await?;

    let (last,): (i64,) =
        sqlx::query_as("SELECT COALESCE(MAX(order_index), 0) FROM topics WHERE course_id = ?")
            .bind(course_id)
            .fetch_one(&mut *tx)
            .await?;

    let topic = Topic {
        id: Uuid::new_v4().to_string(),
        course_id: course_id.to_string(),
        title: req.title,
        content: req.content.unwrap_or_default(),
        order_index: last + 1,
        created_at: Utc::now().to_rfc3339(),
    };

    sqlx::query(
        "INSERT INTO topics (id, course_id, title, content, order_index, created_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&topic.id)
    .bind(&topic.course_id)
    .bind(&topic.title)
    .bind(&topic.content)
    .bind(topic.order_index)
    .bind(&topic.created_at)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(topic)
}

pub async fn update_topic(
    db: &SqlitePool,
    course_id: &str,
    topic_id: &str,
    req: UpdateTopicRequest,
) -> Result<Option<Topic>, sqlx::Error> {
    let mut current = match find_topic(db, course_id, topic_id).await? {
        Some(t) => t,
        None => return Ok(None),
    };

    if let Some(title) = req.title {
        current.title = title;
    }
    if let Some(content) = req.content {
        current.content = content;
    }

    sqlx::query("UPDATE topics SET title = ?1, content = ?2 WHERE id = ?3 AND course_id = ?4")
        .bind(&current.title)
        .bind(&current.content)
        .bind(topic_id)
        .bind(course_id)
        .execute(db)
        .await?;

    Ok(Some(current))
}

/// Removes one topic and closes the gap it leaves in the order sequence.
pub async fn delete_topic(db: &SqlitePool, course_id: &str, topic_id: &str) -> Result<bool, sqlx::Error> {
    let mut tx = db.begin().await?;

    let removed: Option<(i64,)> =
        sqlx::query_as("SELECT order_index FROM topics WHERE id = ? AND course_id = ?")
            .bind(topic_id)
            .bind(course_id)
            .fetch_optional(&mut *tx)
            .await?;

    let Some((removed_index,)) = removed else {
        return Ok(false);
    };

    sqlx::query("DELETE FROM topics WHERE id = ? AND course_id = ?")
        .bind(topic_id)
        .bind(course_id)
        .execute(&mut *tx)
        .await?;

    // Two passes so no intermediate row collides on (course_id, order_index):
    // move the tail above the current maximum, then bring it back shifted by one.
    let (max_index,): (i64,) =
        sqlx::query_as("SELECT COALESCE(MAX(order_index), 0) FROM topics WHERE course_id = ?")
            .bind(course_id)
            .fetch_one(&mut *tx)
            .await?;
    sqlx::query(
        "UPDATE topics SET order_index = order_index + ? WHERE course_id = ? AND order_index > ?",
    )
    .bind(max_index)
    .bind(course_id)
    .bind(removed_index)
    .execute(&mut *tx)
    .await?;
    sqlx::query(
        "UPDATE topics SET order_index = order_index - ? - 1 WHERE course_id = ? AND order_index > ?",
    )
    .bind(max_index)
    .bind(course_id)
    .bind(max_index)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(true)
}

/// Replaces the whole topic set of a course and marks its topics as extracted.
///
/// Topics are ordered by their `order` (array position when absent), ties keep
/// input order, and are stored with dense indices starting at 1. Everything runs
/// in one transaction; on error the previous topics stay in place.
pub async fn replace_topics(
    db: &SqlitePool,
    course_id: &str,
    topics: &[ExtractedTopic],
) -> Result<Vec<Topic>, sqlx::Error> {
    let mut ordered: Vec<(usize, &ExtractedTopic)> = topics
        .iter()
        .enumerate()
        .map(|(idx, t)| (t.order.map(|o| o as usize).unwrap_or(idx + 1), t))
        .collect();
    ordered.sort_by_key(|(key, _)| *key);

    let now = Utc::now().to_rfc3339();
    let mut tx = db.begin().await?;

    sqlx::query("DELETE FROM topics WHERE course_id = ?")
        .bind(course_id)
        .execute(&mut *tx)
        .await?;

    let mut saved = Vec::with_capacity(ordered.len());
    for (position, (_, extracted)) in ordered.into_iter().enumerate() {
        let topic = Topic {
            id: Uuid::new_v4().to_string(),
            course_id: course_id.to_string(),
            title: extracted.title.trim().to_string(),
            content: extracted.flattened_keywords(),
            order_index: position as i64 + 1,
            created_at: now.clone(),
        };

        sqlx::query(
            "INSERT INTO topics (id, course_id, title, content, order_index, created_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&topic.id)
        .bind(&topic.course_id)
        .bind(&topic.title)
        .bind(&topic.content)
        .bind(topic.order_index)
        .bind(&topic.created_at)
        .execute(&mut *tx)
        .await?;

        saved.push(topic);
    }

    sqlx::query("UPDATE courses SET topics_extracted = 1, updated_at = ? WHERE id = ?")
        .bind(&now)
        .bind(course_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(saved)
}
