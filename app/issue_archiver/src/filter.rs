use serde::Serialize;

/// Linear `IssueFilter` input: issues completed before a relative cutoff,
/// optionally restricted to one team.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueFilter {
    completed_at: DateComparator,
    #[serde(skip_serializing_if = "Option::is_none")]
    team: Option<TeamFilter>,
}

#[derive(Debug, Clone, Serialize)]
struct DateComparator {
    lt: String,
}

#[derive(Debug, Clone, Serialize)]
struct TeamFilter {
    key: StringComparator,
}

#[derive(Debug, Clone, Serialize)]
struct StringComparator {
    eq: String,
}

impl IssueFilter {
    pub fn closed_before(days: f64, team_key: Option<&str>) -> Self {
        IssueFilter {
            completed_at: DateComparator {
                lt: relative_duration(days),
            },
            team: team_key.filter(|key| !key.is_empty()).map(|key| TeamFilter {
                key: StringComparator { eq: key.to_owned() },
            }),
        }
    }

    pub fn completed_before(&self) -> &str {
        &self.completed_at.lt
    }

    pub fn team_key(&self) -> Option<&str> {
        self.team.as_ref().map(|team| team.key.eq.as_str())
    }
}

pub fn effective_days(days: f64) -> u64 {
    if days.is_finite() && days >= 1.0 {
        // saturates above u64::MAX, far beyond any meaningful threshold
        days.floor() as u64
    } else {
        1
    }
}

/// ISO-8601 duration relative to now, "-P14D" means 14 days ago.
pub fn relative_duration(days: f64) -> String {
    format!("-P{}D", effective_days(days))
}
