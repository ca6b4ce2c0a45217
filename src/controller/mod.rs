pub mod history;
pub mod latest;
pub mod stats;
pub mod version;

#[cfg(test)]
pub(crate) mod test_support {
    use crate::{
        configuration::{build_configuration, AppState, State},
        provider::DatabasePool,
    };

    pub async fn app_state() -> AppState<State> {
        let config = build_configuration(|_| None).unwrap();
        let database = DatabasePool::in_memory().await.unwrap();
        AppState::new(State::new(config, database).await.unwrap())
    }
}
