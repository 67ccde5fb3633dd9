//! Seed content for a project's primary page.

use chrono::{Datelike, NaiveDate};

/// Renders the primary page: a dated `created::` property, a namespace query
/// block listing the project's sub-pages, and an empty Summary section.
pub fn render_primary_page(created: NaiveDate) -> String {
    format!(
        r#"created:: [[{}]]
- #+BEGIN_QUERY
  {{:title [:h2 "Pages"]
   :query [:find (pull ?p [*])
    :in $ ?current
    :where
     [?c :block/name ?current]
     [?p :block/namespace ?c]
   ]
   :inputs [:query-page]
  }}
  #+END_QUERY
- ## Summary
"#,
        journal_date(created)
    )
}

/// Journal-style date, e.g. `Oct 18th, 2026`.
pub fn journal_date(date: NaiveDate) -> String {
    let day = date.day();
    format!(
        "{} {day}{}, {}",
        date.format("%b"),
        ordinal_suffix(day),
        date.year()
    )
}

fn ordinal_suffix(day: u32) -> &'static str {
    match day {
        4..=20 | 24..=30 => "th",
        _ => match day % 10 {
            1 => "st",
            2 => "nd",
            _ => "rd",
        },
    }
}

#[cfg(test)]
mod tests {
    use super::{journal_date, ordinal_suffix, render_primary_page};
    use chrono::NaiveDate;

    #[test]
    fn ordinal_suffixes_cover_the_irregular_days() {
        let expected = [
            (1, "st"),
            (2, "nd"),
            (3, "rd"),
            (4, "th"),
            (11, "th"),
            (12, "th"),
            (13, "th"),
            (21, "st"),
            (22, "nd"),
            (23, "rd"),
            (30, "th"),
            (31, "st"),
        ];
        for (day, suffix) in expected {
            assert_eq!(ordinal_suffix(day), suffix, "day {day}");
        }
    }

    #[test]
    fn page_starts_with_created_property_and_ends_with_summary() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 2).unwrap();
        assert_eq!(journal_date(date), "Oct 2nd, 2026");

        let page = render_primary_page(date);
        assert!(page.starts_with("created:: [[Oct 2nd, 2026]]\n"));
        assert!(page.contains("  {:title [:h2 \"Pages\"]\n"));
        assert!(page.ends_with("- ## Summary\n"));
    }
}
