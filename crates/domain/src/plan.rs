//! Step plan — the fixed, ordered instruction sequence for one request.
//!
//! The plan is computed up front from the request, the target site and the
//! pacing settings. Executing it is the session controller's job; nothing
//! here talks to a browser.

use std::fmt;
use std::time::Duration;

use crate::request::ReservationRequest;
use crate::time::map_time_to_value;

/// The site the session drives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteProfile {
    /// Root page the session navigates to first.
    pub url: String,
    /// Display name used in failure messages.
    pub name: String,
}

impl Default for SiteProfile {
    fn default() -> Self {
        Self {
            url: "https://www.opentable.com".to_string(),
            name: "OpenTable".to_string(),
        }
    }
}

/// Ceilings for the waits between interactive steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// Wait for a picker control to render.
    pub settle: Duration,
    /// Wait for a results page or restaurant page to load.
    pub page_load: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            settle: Duration::from_millis(500),
            page_load: Duration::from_millis(2000),
        }
    }
}

/// What a single step asks of the automation capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepAction {
    /// Navigate the page to a URL.
    Goto(String),
    /// Perform a natural-language instruction.
    Act(String),
    /// Wait until the page settles, at most for the given duration.
    Settle(Duration),
    /// Nothing to do; the reason is logged.
    Skip(String),
}

impl fmt::Display for StepAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Goto(url) => write!(f, "goto({url})"),
            Self::Act(instruction) => write!(f, "act({instruction})"),
            Self::Settle(ceiling) => write!(f, "settle({}ms)", ceiling.as_millis()),
            Self::Skip(reason) => write!(f, "skip({reason})"),
        }
    }
}

/// A named step of the plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub name: &'static str,
    pub action: StepAction,
}

impl Step {
    fn new(name: &'static str, action: StepAction) -> Self {
        Self { name, action }
    }
}

/// The ordered steps for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepPlan {
    steps: Vec<Step>,
}

impl StepPlan {
    /// Build the plan for `request`.
    ///
    /// `day_label` is the accessible label of the requested day in the
    /// date picker; callers substitute a sentinel when the date could not
    /// be rendered.
    #[must_use]
    pub fn for_request(
        request: &ReservationRequest,
        site: &SiteProfile,
        pacing: &Pacing,
        day_label: &str,
    ) -> Self {
        let time_step = match map_time_to_value(request.time_preference()) {
            Some(value) => StepAction::Act(format!(
                "Select the time option with value \"{value}\" in the time dropdown"
            )),
            None => StepAction::Skip(format!(
                "could not map time preference \"{}\" to a dropdown value",
                request.time_preference()
            )),
        };

        let steps = vec![
            Step::new("navigate", StepAction::Goto(site.url.clone())),
            Step::new(
                "open_region_picker",
                StepAction::Act(
                    "Click the button with aria-label \"Toggle location picker\"".to_string(),
                ),
            ),
            Step::new("await_region_picker", StepAction::Settle(pacing.settle)),
            Step::new(
                "select_region",
                StepAction::Act(format!(
                    "Click the link for the region \"{}\"",
                    request.region()
                )),
            ),
            Step::new(
                "enter_search_term",
                StepAction::Act(format!(
                    "Type \"{}\" into the input field with placeholder \"Location, Restaurant or Cuisine\"",
                    request.search_term()
                )),
            ),
            Step::new(
                "find_table",
                StepAction::Act("Click the button with aria-label \"Find a table\"".to_string()),
            ),
            Step::new("await_results", StepAction::Settle(pacing.page_load)),
            Step::new(
                "select_party_size",
                StepAction::Act(format!(
                    "Select the option for \"{}\" in the party size dropdown",
                    request.party_size()
                )),
            ),
            Step::new("select_time", time_step),
            Step::new(
                "open_date_picker",
                StepAction::Act("Click the date picker button".to_string()),
            ),
            Step::new("await_date_picker", StepAction::Settle(pacing.settle)),
            Step::new(
                "select_date",
                StepAction::Act(format!("Click the button with aria-label \"{day_label}\"")),
            ),
            Step::new(
                "select_first_result",
                StepAction::Act(
                    "Click the first element matching selector `[data-test=\"restaurant-card\"]`"
                        .to_string(),
                ),
            ),
            Step::new("await_result_page", StepAction::Settle(pacing.page_load)),
        ];

        Self { steps }
    }

    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
