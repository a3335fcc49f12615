//! Live calendar sessions
//!
//! Each calendar created through the API is kept in memory under a UUID
//! until it is deleted. Handlers feed it the same events a browser widget
//! would see and return the resulting view.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::{
    calendar::{
        Calendar, CalendarKey, CalendarSelection, CalendarValue, CalendarView, DateValue,
        RangeCalendar, RangeValue, SelectionMode, Transition,
    },
    config::CalendarDefaults,
    error::{AppError, AppResult},
    models::calendar::{
        CalendarCreated, CalendarKind, CreateCalendar, CreateRangeCalendar, NavigateAction,
        NavigateRequest, TransitionResponse,
    },
};

enum Session {
    Range(RangeCalendar),
    Dates(Calendar),
}

impl Session {
    fn kind(&self) -> CalendarKind {
        match self {
            Session::Range(_) => CalendarKind::Range,
            Session::Dates(calendar) => match calendar.mode() {
                SelectionMode::Single => CalendarKind::Single,
                SelectionMode::Multiple => CalendarKind::Multiple,
            },
        }
    }

    fn selection(&mut self) -> &mut dyn CalendarSelection {
        match self {
            Session::Range(calendar) => calendar,
            Session::Dates(calendar) => calendar,
        }
    }
}

/// Route family a request came in on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionFamily {
    Range,
    Dates,
}

impl SessionFamily {
    fn matches(self, session: &Session) -> bool {
        matches!(
            (self, session),
            (SessionFamily::Range, Session::Range(_)) | (SessionFamily::Dates, Session::Dates(_))
        )
    }
}

/// Snapshot the view, handing the pending announcement over with it.
fn take_view(selection: &mut dyn CalendarSelection) -> CalendarView {
    let view = selection.view();
    selection.core_mut().announcer_mut().take();
    view
}

/// Each widget sits behind its own lock; the map lock is only held to look
/// one up, add one or remove one.
#[derive(Clone)]
pub struct CalendarService {
    sessions: Arc<RwLock<HashMap<Uuid, Arc<Mutex<Session>>>>>,
    defaults: CalendarDefaults,
}

impl CalendarService {
    pub fn new(defaults: CalendarDefaults) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            defaults,
        }
    }

    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }

    async fn insert(&self, mut session: Session) -> AppResult<CalendarCreated> {
        let mut sessions = self.sessions.write().await;
        if sessions.len() >= self.defaults.max_sessions {
            return Err(AppError::Capacity(format!(
                "At most {} calendars can be open at once",
                self.defaults.max_sessions
            )));
        }
        let id = Uuid::new_v4();
        let kind = session.kind();
        let view = take_view(session.selection());
        sessions.insert(id, Arc::new(Mutex::new(session)));
        tracing::info!(%id, ?kind, "calendar created");
        Ok(CalendarCreated { id, kind, view })
    }

    /// Create a range calendar
    pub async fn create_range(&self, request: CreateRangeCalendar) -> AppResult<CalendarCreated> {
        let options = request.options.into_options(&self.defaults);
        let placeholder = request.placeholder.unwrap_or_else(DateValue::today);

        let mut calendar = RangeCalendar::new(options, placeholder)
            .with_ranges(request.ranges)
            .on_range_select(|value| tracing::debug!(?value, "range committed"));
        if request.learn_more {
            calendar = calendar.on_learn_more(|date, index| {
                tracing::info!(%date, index, "reserved day activated");
            });
        }
        if let Some(today) = request.today {
            calendar.core_mut().set_today(today.date());
        }
        if let Some(value) = request.value {
            calendar.set_value(RangeValue {
                start: value.start,
                end: value.end,
            });
        }

        self.insert(Session::Range(calendar)).await
    }

    /// Create a single or multiple date calendar
    pub async fn create_calendar(&self, request: CreateCalendar) -> AppResult<CalendarCreated> {
        let options = request.options.into_options(&self.defaults);
        let placeholder = request.placeholder.unwrap_or_else(DateValue::today);

        let mut calendar = Calendar::new(options, placeholder, request.mode)
            .on_date_select(|date| tracing::debug!(%date, "date committed"));
        if let Some(today) = request.today {
            calendar.core_mut().set_today(today.date());
        }
        if let Some(value) = request.value {
            calendar.set_value(value)?;
        }

        self.insert(Session::Dates(calendar)).await
    }

    async fn with_session<F, T>(&self, family: SessionFamily, id: Uuid, f: F) -> AppResult<T>
    where
        F: FnOnce(&mut Session) -> AppResult<T>,
    {
        let session = self
            .sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Calendar {} not found", id)))?;
        let mut session = session.lock().await;
        if !family.matches(&session) {
            return Err(AppError::NotFound(format!("Calendar {} not found", id)));
        }
        f(&mut session)
    }

    async fn interact<F>(&self, family: SessionFamily, id: Uuid, f: F) -> AppResult<TransitionResponse>
    where
        F: FnOnce(&mut dyn CalendarSelection) -> AppResult<Transition>,
    {
        self.with_session(family, id, |session| {
            let selection = session.selection();
            let transition = f(&mut *selection)?;
            tracing::debug!(%id, ?transition, "calendar interaction");
            Ok(TransitionResponse {
                transition,
                view: take_view(selection),
            })
        })
        .await
    }

    /// Current view of a calendar
    pub async fn view(&self, family: SessionFamily, id: Uuid) -> AppResult<CalendarView> {
        self.with_session(family, id, |session| Ok(session.selection().view()))
            .await
    }

    pub async fn delete(&self, family: SessionFamily, id: Uuid) -> AppResult<()> {
        self.with_session(family, id, |_| Ok(())).await?;
        if self.sessions.write().await.remove(&id).is_none() {
            return Err(AppError::NotFound(format!("Calendar {} not found", id)));
        }
        tracing::info!(%id, "calendar deleted");
        Ok(())
    }

    /// Click or keyboard select on a day cell
    pub async fn activate(&self, family: SessionFamily, id: Uuid, date: DateValue) -> AppResult<TransitionResponse> {
        self.interact(family, id, |selection| Ok(selection.press(date)))
            .await
    }

    /// Hover or focus-in on a day cell
    pub async fn focus(&self, family: SessionFamily, id: Uuid, date: DateValue) -> AppResult<TransitionResponse> {
        self.interact(family, id, |selection| {
            selection.focus(date);
            Ok(Transition::Ignored)
        })
        .await
    }

    pub async fn keydown(
        &self,
        family: SessionFamily,
        id: Uuid,
        key: &str,
        target: &str,
    ) -> AppResult<TransitionResponse> {
        let key = CalendarKey::from_key(key);
        self.interact(family, id, |selection| Ok(selection.handle_key(key, target)?))
            .await
    }

    /// Page buttons and year/month pickers. A disabled page button is a no-op.
    pub async fn navigate(
        &self,
        family: SessionFamily,
        id: Uuid,
        request: NavigateRequest,
    ) -> AppResult<TransitionResponse> {
        self.interact(family, id, |selection| {
            let next_disabled = selection.core().is_next_button_disabled();
            let prev_disabled = selection.core().is_prev_button_disabled();
            match request.action {
                NavigateAction::NextPage if next_disabled => return Ok(Transition::Ignored),
                NavigateAction::PrevPage if prev_disabled => return Ok(Transition::Ignored),
                NavigateAction::NextPage => selection.next_page(),
                NavigateAction::PrevPage => selection.prev_page(),
                NavigateAction::NextYear => selection.next_year(),
                NavigateAction::PrevYear => selection.prev_year(),
                NavigateAction::SetYear => {
                    let year = request
                        .value
                        .ok_or_else(|| AppError::BadRequest("set_year needs a value".to_string()))?;
                    selection.set_year(year);
                }
                NavigateAction::SetMonth => {
                    let month = request
                        .value
                        .and_then(|month| u32::try_from(month).ok())
                        .filter(|month| (1..=12).contains(month))
                        .ok_or_else(|| AppError::BadRequest("set_month needs a month between 1 and 12".to_string()))?;
                    selection.set_month(month);
                }
            }
            Ok(Transition::Navigated {
                placeholder: selection.core().placeholder(),
            })
        })
        .await
    }

    /// Replace the selection of a range calendar from outside
    pub async fn set_range_value(&self, id: Uuid, value: RangeValue) -> AppResult<TransitionResponse> {
        self.with_session(SessionFamily::Range, id, |session| {
            let Session::Range(calendar) = session else {
                return Err(AppError::NotFound(format!("Calendar {} not found", id)));
            };
            calendar.set_value(value);
            Ok(TransitionResponse {
                transition: Transition::Ignored,
                view: take_view(calendar),
            })
        })
        .await
    }

    /// Replace the selection of a single/multiple calendar from outside
    pub async fn set_value(&self, id: Uuid, value: Option<CalendarValue>) -> AppResult<TransitionResponse> {
        self.with_session(SessionFamily::Dates, id, |session| {
            let Session::Dates(calendar) = session else {
                return Err(AppError::NotFound(format!("Calendar {} not found", id)));
            };
            let value = value.unwrap_or_else(|| CalendarValue::empty(calendar.mode()));
            calendar.set_value(value)?;
            Ok(TransitionResponse {
                transition: Transition::Ignored,
                view: take_view(calendar),
            })
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::calendar::{CalendarSettings, RangeValueRequest};

    fn date(y: i32, m: u32, d: u32) -> DateValue {
        DateValue::from_ymd(y, m, d).unwrap()
    }

    fn range_request() -> CreateRangeCalendar {
        CreateRangeCalendar {
            placeholder: Some(date(2024, 3, 1)),
            ..CreateRangeCalendar::default()
        }
    }

    #[tokio::test]
    async fn test_session_limit() {
        let service = CalendarService::new(CalendarDefaults {
            max_sessions: 1,
            ..CalendarDefaults::default()
        });
        service.create_range(range_request()).await.unwrap();
        let err = service.create_range(range_request()).await.unwrap_err();
        assert!(matches!(err, AppError::Capacity(_)));
        assert_eq!(service.count().await, 1);
    }

    #[tokio::test]
    async fn test_routes_are_family_scoped() {
        let service = CalendarService::new(CalendarDefaults::default());
        let created = service.create_range(range_request()).await.unwrap();
        assert!(service.view(SessionFamily::Range, created.id).await.is_ok());
        assert!(matches!(
            service.view(SessionFamily::Dates, created.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(service.delete(SessionFamily::Dates, created.id).await.is_err());
        service.delete(SessionFamily::Range, created.id).await.unwrap();
        assert_eq!(service.count().await, 0);
    }

    #[tokio::test]
    async fn test_announcement_is_delivered_once() {
        let service = CalendarService::new(CalendarDefaults::default());
        let created = service.create_range(range_request()).await.unwrap();
        let response = service
            .activate(SessionFamily::Range, created.id, date(2024, 3, 5))
            .await
            .unwrap();
        assert_eq!(response.transition, Transition::Started { date: date(2024, 3, 5) });
        assert!(response.view.announcement.is_some());
        let view = service.view(SessionFamily::Range, created.id).await.unwrap();
        assert!(view.announcement.is_none());
    }

    #[tokio::test]
    async fn test_navigate_respects_disabled_buttons() {
        let service = CalendarService::new(CalendarDefaults::default());
        let created = service
            .create_range(CreateRangeCalendar {
                placeholder: Some(date(2024, 3, 1)),
                options: CalendarSettings {
                    max_value: Some(date(2024, 3, 31)),
                    ..CalendarSettings::default()
                },
                value: Some(RangeValueRequest::default()),
                ..CreateRangeCalendar::default()
            })
            .await
            .unwrap();
        let request = NavigateRequest { action: NavigateAction::NextPage, value: None };
        let response = service.navigate(SessionFamily::Range, created.id, request).await.unwrap();
        assert!(response.transition.is_ignored());

        let request = NavigateRequest { action: NavigateAction::SetMonth, value: Some(13) };
        let err = service.navigate(SessionFamily::Range, created.id, request).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_busy_calendar_does_not_block_others() {
        let service = CalendarService::new(CalendarDefaults::default());
        let busy = service.create_range(range_request()).await.unwrap();
        let idle = service.create_range(range_request()).await.unwrap();

        let session = service.sessions.read().await.get(&busy.id).cloned().unwrap();
        let _held = session.lock().await;

        let response = tokio::time::timeout(
            std::time::Duration::from_secs(1),
            service.activate(SessionFamily::Range, idle.id, date(2024, 3, 5)),
        )
        .await
        .expect("idle calendar was blocked");
        assert!(response.is_ok());
        assert_eq!(service.count().await, 2);
    }

    #[tokio::test]
    async fn test_value_shape_mismatch_is_an_error() {
        let service = CalendarService::new(CalendarDefaults::default());
        let created = service
            .create_calendar(CreateCalendar {
                mode: SelectionMode::Single,
                placeholder: Some(date(2024, 3, 1)),
                today: None,
                options: CalendarSettings::default(),
                value: None,
            })
            .await
            .unwrap();
        let err = service
            .set_value(created.id, Some(CalendarValue::Multiple(vec![date(2024, 3, 2)])))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Calendar(_)));
    }
}
