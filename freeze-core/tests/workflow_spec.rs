mod common;

use speculate2::speculate;

speculate! {
    use std::sync::Mutex;

    use chrono::Utc;
    use common::{FlakyStore, Write};
    use freeze_core::local::{LocalSource, LocalWorkflowState, LocalWorkflowStore, MemoryStore};
    use freeze_core::models::{
        ActivityAction, Bureau, BureauStatusUpsert, FreezeEvent, IssueType, NewFreezeIssue,
        WorkflowState, WorkflowStep,
    };
    use freeze_core::workflow::{
        AnonymousFlow, AuthenticatedFlow, Checklist, IssueReport, NoopTelemetry, TelemetrySink,
        WorkflowError,
    };
    use uuid::Uuid;

    #[derive(Default)]
    struct RecordingTelemetry {
        freezes: Mutex<Vec<FreezeEvent>>,
        issues: Mutex<Vec<NewFreezeIssue>>,
    }

    impl TelemetrySink for RecordingTelemetry {
        fn freeze(&self, event: FreezeEvent) {
            self.freezes.lock().unwrap().push(event);
        }

        fn issue(&self, issue: NewFreezeIssue) {
            self.issues.lock().unwrap().push(issue);
        }
    }

    fn report() -> IssueReport {
        IssueReport {
            issue_type: IssueType::IdentityVerification,
            issue_details: Some("quiz failed".into()),
        }
    }

    describe "the state machine" {
        it "refuses to leave the checklist until every item is ready" {
            let mut state = WorkflowState::default();
            let err = state.complete_checklist(&Checklist::from_flags(&[true; 6])).unwrap_err();
            assert!(matches!(err, WorkflowError::ChecklistIncomplete { remaining: 1 }));
            assert_eq!(state.current_step, WorkflowStep::Checklist);

            assert_eq!(state.complete_checklist(&Checklist::all_ready()).unwrap(), WorkflowStep::Equifax);
            assert!(state.checklist_completed);
        }

        it "only confirms the bureau that is current" {
            let mut state = WorkflowState { current_step: WorkflowStep::Equifax, ..Default::default() };
            let err = state.confirm(Bureau::Experian, Utc::now()).unwrap_err();
            assert!(matches!(err, WorkflowError::InvalidTransition { step: WorkflowStep::Equifax, .. }));
            assert!(!state.experian_completed);
        }

        it "advances on skip without marking the bureau" {
            let mut state = WorkflowState { current_step: WorkflowStep::Transunion, ..Default::default() };
            assert_eq!(state.skip(Bureau::Transunion, Utc::now()).unwrap(), WorkflowStep::Experian);
            assert!(!state.transunion_completed);
        }

        it "always moves from experian to complete and stamps completion" {
            let mut confirmed = WorkflowState { current_step: WorkflowStep::Experian, ..Default::default() };
            let mut skipped = confirmed.clone();

            assert_eq!(confirmed.confirm(Bureau::Experian, Utc::now()).unwrap(), WorkflowStep::Complete);
            assert_eq!(skipped.skip(Bureau::Experian, Utc::now()).unwrap(), WorkflowStep::Complete);
            assert!(confirmed.completed_at.is_some());
            assert!(skipped.completed_at.is_some());
        }

        it "navigates without touching completion flags" {
            let mut state = WorkflowState {
                current_step: WorkflowStep::Complete,
                equifax_completed: true,
                ..Default::default()
            };
            state.navigate(WorkflowStep::Checklist);
            assert_eq!(state.current_step, WorkflowStep::Checklist);
            assert!(state.equifax_completed);
            assert!(!state.checklist_completed);
        }

        it "resumes a finished workflow at the first bureau not done in fixed order" {
            let state = WorkflowState {
                current_step: WorkflowStep::Complete,
                experian_completed: true,
                ..Default::default()
            };
            assert_eq!(state.resume_step(|b| state.bureau_completed(b)), WorkflowStep::Equifax);

            let done = WorkflowState {
                current_step: WorkflowStep::Complete,
                equifax_completed: true,
                transunion_completed: true,
                experian_completed: true,
                ..Default::default()
            };
            assert_eq!(done.resume_step(|b| done.bureau_completed(b)), WorkflowStep::Complete);
        }
    }

    describe "the anonymous flow" {
        it "persists every transition to the local store" {
            let local = LocalWorkflowStore::new(MemoryStore::new());
            let telemetry = NoopTelemetry;
            {
                let mut flow = AnonymousFlow::start_direct(&local, &telemetry);
                flow.complete_checklist(&Checklist::all_ready()).unwrap();
                flow.confirm(Bureau::Equifax).unwrap();
            }

            let saved = local.load_direct().unwrap();
            assert_eq!(saved.source, LocalSource::Direct);
            assert_eq!(saved.progress.current_step, WorkflowStep::Transunion);
            assert!(saved.progress.equifax_completed);

            let resumed = AnonymousFlow::start_direct(&local, &telemetry);
            assert_eq!(resumed.current_step(), WorkflowStep::Transunion);
        }

        it "tags freeze telemetry with the device session id and breach code" {
            let local = LocalWorkflowStore::new(MemoryStore::new());
            let telemetry = RecordingTelemetry::default();
            let mut flow = AnonymousFlow::start_breach(&local, &telemetry, "acme2024");
            flow.complete_checklist(&Checklist::all_ready()).unwrap();
            flow.confirm(Bureau::Equifax).unwrap();
            flow.skip(Bureau::Transunion, IssueType::SiteError, None).unwrap();

            let freezes = telemetry.freezes.lock().unwrap();
            assert_eq!(freezes.len(), 1);
            assert_eq!(freezes[0].breach_code.as_deref(), Some("ACME2024"));
            assert_eq!(freezes[0].session_id, freeze_core::session::session_id(local.kv()));

            let issues = telemetry.issues.lock().unwrap();
            assert_eq!(issues.len(), 1);
            assert_eq!(issues[0].bureau, Bureau::Transunion);
            assert!(local.load_breach().is_some());
        }

        it "starts fresh when saved direct state has another source" {
            let kv = MemoryStore::new();
            let local = LocalWorkflowStore::new(&kv);
            let mut foreign = LocalWorkflowState::breach("BANK2024");
            foreign.progress.current_step = WorkflowStep::Experian;
            let json = serde_json::to_string(&foreign).unwrap();
            freeze_core::local::KeyValueStore::set(&kv, freeze_core::local::DIRECT_STATE_KEY, &json).unwrap();

            let flow = AnonymousFlow::start_direct(&local, &NoopTelemetry);
            assert_eq!(flow.current_step(), WorkflowStep::Checklist);
            assert_eq!(flow.state().source, LocalSource::Direct);
        }

        it "lands on the first incomplete bureau when re-entering a finished flow" {
            let local = LocalWorkflowStore::new(MemoryStore::new());
            let mut saved = LocalWorkflowState::direct();
            saved.progress.current_step = WorkflowStep::Complete;
            saved.progress.equifax_completed = true;
            saved.progress.experian_completed = true;
            local.save(&saved);

            let flow = AnonymousFlow::start_direct(&local, &NoopTelemetry);
            assert_eq!(flow.current_step(), WorkflowStep::Transunion);
        }
    }

    describe "the authenticated flow" {
        before {
            let store = FlakyStore::new();
            let user = Uuid::new_v4();
        }

        it "writes status, activity and progress on confirm" {
            let mut flow = AuthenticatedFlow::load(&store, user, None).unwrap();
            flow.complete_checklist(&Checklist::all_ready()).unwrap();
            let outcome = flow.confirm(Bureau::Equifax).unwrap();

            assert!(outcome.newly_frozen);
            assert_eq!(outcome.next_step, WorkflowStep::Transunion);
            assert!(store.db.get_bureau_status(user, Bureau::Equifax).unwrap().unwrap().is_frozen());
            assert_eq!(store.db.count_activity(user, Bureau::Equifax, ActivityAction::Frozen).unwrap(), 1);

            let progress = store.db.get_workflow_progress(user).unwrap().unwrap();
            assert_eq!(progress.current_step, WorkflowStep::Transunion);
            assert!(progress.equifax_completed);
        }

        it "logs one frozen entry when the same bureau is confirmed twice" {
            let mut flow = AuthenticatedFlow::load(&store, user, Some(Bureau::Equifax)).unwrap();
            let first = flow.confirm(Bureau::Equifax).unwrap();

            flow.navigate(WorkflowStep::Equifax);
            let second = flow.confirm(Bureau::Equifax).unwrap();

            assert!(first.newly_frozen);
            assert!(!second.newly_frozen);
            assert_eq!(store.db.count_activity(user, Bureau::Equifax, ActivityAction::Frozen).unwrap(), 1);

            let stored = store.db.get_bureau_status(user, Bureau::Equifax).unwrap().unwrap();
            assert_eq!(stored.frozen_date, second.status.frozen_date);
            assert!(stored.frozen_date >= first.status.frozen_date);
        }

        it "records an issue and leaves the status alone on skip" {
            let mut flow = AuthenticatedFlow::load(&store, user, Some(Bureau::Transunion)).unwrap();
            assert_eq!(flow.skip(Bureau::Transunion, report()).unwrap(), WorkflowStep::Experian);

            assert!(store.db.get_bureau_status(user, Bureau::Transunion).unwrap().is_none());
            assert_eq!(store.db.count_activity(user, Bureau::Transunion, ActivityAction::IssueReported).unwrap(), 1);
            assert_eq!(store.db.count_freeze_issues(user).unwrap(), 1);
            assert!(!flow.state().transunion_completed);
        }

        it "does not advance when the progress write fails" {
            let mut flow = AuthenticatedFlow::load(&store, user, Some(Bureau::Equifax)).unwrap();
            store.fail(Write::Progress);

            let err = flow.confirm(Bureau::Equifax).unwrap_err();
            assert!(err.is_retryable());
            assert_eq!(flow.current_step(), WorkflowStep::Equifax);
            assert!(!flow.state().equifax_completed);

            store.heal();
            let retried = flow.confirm(Bureau::Equifax).unwrap();
            assert_eq!(retried.next_step, WorkflowStep::Transunion);
            assert_eq!(store.db.count_activity(user, Bureau::Equifax, ActivityAction::Frozen).unwrap(), 1);
        }

        it "does not advance when the status write fails" {
            let mut flow = AuthenticatedFlow::load(&store, user, Some(Bureau::Experian)).unwrap();
            store.fail(Write::Status(Bureau::Experian));

            assert!(flow.confirm(Bureau::Experian).unwrap_err().is_retryable());
            assert_eq!(flow.current_step(), WorkflowStep::Experian);
            assert_eq!(store.db.count_activity(user, Bureau::Experian, ActivityAction::Frozen).unwrap(), 0);
        }

        it "leaves the bureau unfrozen when the frozen entry cannot be logged" {
            let mut flow = AuthenticatedFlow::load(&store, user, Some(Bureau::Equifax)).unwrap();
            store.fail(Write::Activity(Bureau::Equifax));

            assert!(flow.confirm(Bureau::Equifax).unwrap_err().is_retryable());
            assert_eq!(flow.current_step(), WorkflowStep::Equifax);
            assert!(!flow.state().equifax_completed);
            assert!(store.db.get_bureau_status(user, Bureau::Equifax).unwrap().is_none());

            store.heal();
            let retried = flow.confirm(Bureau::Equifax).unwrap();
            assert!(retried.newly_frozen);
            assert_eq!(retried.next_step, WorkflowStep::Transunion);
            assert_eq!(store.db.count_activity(user, Bureau::Equifax, ActivityAction::Frozen).unwrap(), 1);
        }

        it "resumes at experian when only experian is missing after completion" {
            let now = Utc::now();
            store.db.upsert_bureau_status(user, &BureauStatusUpsert::frozen(Bureau::Equifax, now)).unwrap();
            store.db.upsert_bureau_status(user, &BureauStatusUpsert::frozen(Bureau::Transunion, now)).unwrap();
            store.db.upsert_bureau_status(user, &BureauStatusUpsert::not_frozen(Bureau::Experian, now)).unwrap();
            store.db.upsert_workflow_progress(user, &WorkflowState {
                current_step: WorkflowStep::Complete,
                checklist_completed: true,
                equifax_completed: true,
                transunion_completed: true,
                experian_completed: false,
                completed_at: Some(now),
            }).unwrap();

            let flow = AuthenticatedFlow::load(&store, user, None).unwrap();
            assert_eq!(flow.current_step(), WorkflowStep::Experian);
        }

        it "stays on complete when every bureau is frozen" {
            let now = Utc::now();
            for bureau in Bureau::ALL {
                store.db.upsert_bureau_status(user, &BureauStatusUpsert::frozen(bureau, now)).unwrap();
            }
            store.db.upsert_workflow_progress(user, &WorkflowState {
                current_step: WorkflowStep::Complete,
                ..Default::default()
            }).unwrap();

            let flow = AuthenticatedFlow::load(&store, user, None).unwrap();
            assert_eq!(flow.current_step(), WorkflowStep::Complete);
        }
    }
}
