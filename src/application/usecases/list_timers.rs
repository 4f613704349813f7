use crate::application::{ActiveTimer, AppResult, Clock, TimerStore};
use crate::domain::UserId;

pub struct ListTimersUseCase<'a> {
    pub store: &'a TimerStore,
    pub clock: &'a dyn Clock,
}

impl<'a> ListTimersUseCase<'a> {
    pub fn execute(&self, user_id: UserId) -> AppResult<Vec<ActiveTimer>> {
        self.store.list_active(user_id, self.clock.now())
    }
}
