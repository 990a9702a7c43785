//! 内容日历月视图

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc, Weekday};
use serde::Serialize;

use super::post::ScheduledPost;

/// 某一天及其帖子
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub weekday: String,
    pub posts: Vec<ScheduledPost>,
}

/// 月视图
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarMonth {
    pub year: i32,
    pub month: u32,
    /// 第一天之前需要空出的格子数（周一为一周开始）
    pub leading_blanks: u32,
    pub total_posts: usize,
    pub days: Vec<CalendarDay>,
}

/// 月份的 UTC 时间范围 `[start, end)`，月份非法返回 None
pub fn month_range(year: i32, month: u32) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((
        Utc.from_utc_datetime(&first.and_hms_opt(0, 0, 0)?),
        Utc.from_utc_datetime(&next.and_hms_opt(0, 0, 0)?),
    ))
}

impl CalendarMonth {
    /// 按天分组构建月视图；不属于该月的帖子被忽略，同日帖子按时间排序
    pub fn build(year: i32, month: u32, posts: &[ScheduledPost]) -> Option<Self> {
        let (start, end) = month_range(year, month)?;
        let first = start.date_naive();
        let day_count = (end - start).num_days();

        let mut days: Vec<CalendarDay> = (0..day_count)
            .map(|offset| {
                let date = first + Duration::days(offset);
                CalendarDay {
                    date,
                    weekday: weekday_name(date.weekday()).to_string(),
                    posts: Vec::new(),
                }
            })
            .collect();

        let mut total_posts = 0;
        for post in posts {
            if post.scheduled_at < start || post.scheduled_at >= end {
                continue;
            }
            let index = (post.scheduled_at.date_naive() - first).num_days() as usize;
            if let Some(day) = days.get_mut(index) {
                day.posts.push(post.clone());
                total_posts += 1;
            }
        }

        for day in &mut days {
            day.posts.sort_by_key(|p| p.scheduled_at);
        }

        Some(Self {
            year,
            month,
            leading_blanks: first.weekday().num_days_from_monday(),
            total_posts,
            days,
        })
    }
}

fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::post::{Platform, PostInput};

    fn post_at(at: DateTime<Utc>) -> ScheduledPost {
        ScheduledPost::create(&PostInput {
            title: String::new(),
            caption: "Fresh batch".to_string(),
            platforms: vec![Platform::Instagram],
            image_url: None,
            product_id: None,
            scheduled_at: at,
            status: None,
        })
    }

    #[test]
    fn test_month_range() {
        let (start, end) = month_range(2026, 12).unwrap();
        assert_eq!(start.to_rfc3339(), "2026-12-01T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2027-01-01T00:00:00+00:00");
        assert!(month_range(2026, 13).is_none());
        assert!(month_range(2026, 0).is_none());
    }

    #[test]
    fn test_build_groups_posts_by_day() {
        let late = Utc.with_ymd_and_hms(2026, 2, 14, 18, 0, 0).unwrap();
        let early = Utc.with_ymd_and_hms(2026, 2, 14, 9, 0, 0).unwrap();
        let outside = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let posts = vec![post_at(late), post_at(early), post_at(outside)];

        let month = CalendarMonth::build(2026, 2, &posts).unwrap();
        assert_eq!(month.days.len(), 28);
        assert_eq!(month.total_posts, 2);
        // 2026-02-01 是周日
        assert_eq!(month.leading_blanks, 6);
        assert_eq!(month.days[0].weekday, "sunday");

        let valentines = &month.days[13];
        assert_eq!(valentines.posts.len(), 2);
        assert_eq!(valentines.posts[0].scheduled_at, early);
    }
}
