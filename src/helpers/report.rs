use std::collections::BTreeMap;

use crate::models::harvest::{DailyHours, DateRange, User};

/// Classification of a day's hour count for color-coding: under 4 hours is
/// low, under 6 is medium, everything else is high.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    Low,
    Medium,
    High,
}

impl Band {
    pub fn of(hours: u32) -> Self {
        match hours {
            0..=3 => Band::Low,
            4..=5 => Band::Medium,
            _ => Band::High,
        }
    }

    pub fn background(self) -> &'static str {
        match self {
            Band::Low => "#A63C45",
            Band::Medium => "#F2CF63",
            Band::High => "#88BF78",
        }
    }

    pub fn foreground(self) -> &'static str {
        match self {
            Band::Low => "#FFF",
            Band::Medium | Band::High => "#000",
        }
    }
}

/// A rendered shame report, ready for dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub subject: String,
    pub html: String,
}

/// Render the HTML summary table. Users without a timesheet (their entries
/// fetch failed) get no row. Pure and deterministic for a given input.
pub fn render(
    users: &[User],
    timesheets: &BTreeMap<u64, DailyHours>,
    range: &DateRange,
) -> Report {
    let subject = format!(
        "Harvest Hours for {} to {}",
        range.start.format("%d/%m/%Y"),
        range.end.format("%d/%m/%Y")
    );

    let mut html = String::new();
    html.push_str("<html><body>");
    html.push_str("<h1>Harvest Log</h1>");
    html.push_str(&format!("<p>{subject}</p>"));

    html.push_str("<table><tr><th>Name</th>");
    for day in range.days() {
        html.push_str(&format!("<th>{}</th>", day.format("%d/%m")));
    }
    html.push_str("</tr>");

    for user in users {
        let Some(timesheet) = timesheets.get(&user.id) else {
            continue;
        };

        html.push_str("<tr>");
        html.push_str(&format!(
            r#"<td style="text-align:right">{}</td>"#,
            user.display_name()
        ));
        for hours in timesheet.values() {
            let band = Band::of(*hours);
            html.push_str(&format!(
                r#"<td style="text-align:center;background-color:{};color:{};">{}</td>"#,
                band.background(),
                band.foreground(),
                hours
            ));
        }
        html.push_str("</tr>");
    }

    html.push_str("</table>");
    html.push_str("</body></html>");

    Report { subject, html }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn alice() -> User {
        User {
            id: 1,
            first_name: "Alice".to_string(),
            last_name: "Example".to_string(),
            email: "alice@example.com".to_string(),
        }
    }

    #[test]
    fn band_boundaries_are_exact() {
        assert_eq!(Band::of(0), Band::Low);
        assert_eq!(Band::of(3), Band::Low);
        assert_eq!(Band::of(4), Band::Medium);
        assert_eq!(Band::of(5), Band::Medium);
        assert_eq!(Band::of(6), Band::High);
        assert_eq!(Band::of(14), Band::High);
    }

    #[test]
    fn low_band_gets_white_text_on_red() {
        assert_eq!(Band::Low.background(), "#A63C45");
        assert_eq!(Band::Low.foreground(), "#FFF");
        assert_eq!(Band::Medium.foreground(), "#000");
        assert_eq!(Band::High.foreground(), "#000");
    }

    #[test]
    fn subject_uses_day_month_year_boundaries() {
        let range = DateRange::new(date(2024, 1, 1), date(2024, 1, 3)).unwrap();
        let report = render(&[], &BTreeMap::new(), &range);
        assert_eq!(report.subject, "Harvest Hours for 01/01/2024 to 03/01/2024");
    }

    #[test]
    fn renders_expected_document() {
        let range = DateRange::new(date(2024, 1, 1), date(2024, 1, 3)).unwrap();
        let timesheet: DailyHours = [
            (date(2024, 1, 1), 3),
            (date(2024, 1, 2), 5),
            (date(2024, 1, 3), 0),
        ]
        .into_iter()
        .collect();
        let timesheets: BTreeMap<u64, DailyHours> = [(1, timesheet)].into_iter().collect();

        let report = render(&[alice()], &timesheets, &range);

        let expected = concat!(
            "<html><body>",
            "<h1>Harvest Log</h1>",
            "<p>Harvest Hours for 01/01/2024 to 03/01/2024</p>",
            "<table><tr><th>Name</th><th>01/01</th><th>02/01</th><th>03/01</th></tr>",
            "<tr>",
            r#"<td style="text-align:right">Alice Example</td>"#,
            r#"<td style="text-align:center;background-color:#A63C45;color:#FFF;">3</td>"#,
            r#"<td style="text-align:center;background-color:#F2CF63;color:#000;">5</td>"#,
            r#"<td style="text-align:center;background-color:#A63C45;color:#FFF;">0</td>"#,
            "</tr>",
            "</table></body></html>",
        );
        assert_eq!(report.html, expected);
    }

    #[test]
    fn user_without_timesheet_gets_no_row() {
        let range = DateRange::new(date(2024, 1, 1), date(2024, 1, 1)).unwrap();
        let report = render(&[alice()], &BTreeMap::new(), &range);

        assert!(!report.html.contains("Alice Example"));
        // Header row still renders.
        assert!(report.html.contains("<th>01/01</th>"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let range = DateRange::new(date(2024, 1, 1), date(2024, 1, 2)).unwrap();
        let timesheets: BTreeMap<u64, DailyHours> = [(
            1,
            [(date(2024, 1, 1), 7), (date(2024, 1, 2), 2)]
                .into_iter()
                .collect(),
        )]
        .into_iter()
        .collect();

        let first = render(&[alice()], &timesheets, &range);
        let second = render(&[alice()], &timesheets, &range);
        assert_eq!(first, second);
    }
}
