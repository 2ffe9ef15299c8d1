use crate::state::Awaiting;
use crate::{
    added_products, compose_message, dedupe, Effect, Msg, RunStage, RunState,
    NOTIFICATION_SUBJECT,
};

/// Pure update function: applies a message to state and returns any effects.
///
/// Messages that do not fit the current stage are ignored.
pub fn update(mut state: RunState, msg: Msg) -> (RunState, Vec<Effect>) {
    let effects = match msg {
        Msg::ConfigValidated => {
            if state.stage() != RunStage::Start {
                return (state, Vec::new());
            }
            state.set_stage(RunStage::ConfigValidated);
            vec![Effect::LoadState]
        }
        Msg::StateLoaded(previous) => {
            if state.stage() != RunStage::ConfigValidated {
                return (state, Vec::new());
            }
            state.record_previous(previous);
            state.set_stage(RunStage::StateLoaded);
            vec![Effect::FetchProducts]
        }
        Msg::ProductsFetched(fetched) => {
            if state.stage() != RunStage::StateLoaded {
                return (state, Vec::new());
            }
            state.set_stage(RunStage::Fetched);

            state.record_current(dedupe(fetched));
            state.set_stage(RunStage::Deduplicated);

            let previous = state.take_previous();
            let added = added_products(&previous, state.current());
            state.set_stage(RunStage::Diffed);

            state.plan_notifications(added);
            state.set_stage(RunStage::Notified(0));
            next_notification_or_save(&mut state)
        }
        Msg::NotificationFinished(outcome) => {
            let RunStage::Notified(attempted) = state.stage() else {
                return (state, Vec::new());
            };
            if state.awaiting() != Awaiting::Delivery {
                return (state, Vec::new());
            }
            // A failed delivery is counted and the run moves on to the next product.
            state.record_delivery(outcome);
            state.set_stage(RunStage::Notified(attempted + 1));
            next_notification_or_save(&mut state)
        }
        Msg::StateSaved => {
            if state.awaiting() != Awaiting::Save {
                return (state, Vec::new());
            }
            state.set_awaiting(Awaiting::Nothing);
            state.set_stage(RunStage::StateSaved);
            vec![Effect::Finish(state.summary())]
        }
        Msg::Finished => {
            if state.stage() != RunStage::StateSaved {
                return (state, Vec::new());
            }
            state.set_stage(RunStage::Done);
            Vec::new()
        }
    };
    (state, effects)
}

fn next_notification_or_save(state: &mut RunState) -> Vec<Effect> {
    match state.next_pending() {
        Some(product) => {
            state.set_awaiting(Awaiting::Delivery);
            let body = compose_message(&product);
            vec![Effect::Notify {
                product,
                subject: NOTIFICATION_SUBJECT.to_string(),
                body,
            }]
        }
        None => {
            state.set_awaiting(Awaiting::Save);
            vec![Effect::SaveState(state.current().to_vec())]
        }
    }
}
