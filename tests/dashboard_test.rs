mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{hr_fixture, job_payload, session_for, MockIdentity, MockStorage};
use recruiter_dashboard::dashboard::DashboardSession;
use recruiter_dashboard::error::Error;
use recruiter_dashboard::models::{ApplicationStatus, Principal, Role, UNKNOWN_LABEL};
use recruiter_dashboard::mutation::NotificationVariant;
use recruiter_dashboard::services::identity_service::StaticIdentityProvider;
use recruiter_dashboard::store::{MemoryStore, StoreOp};
use tokio_test::{assert_err, assert_ok};
use url::Url;
use uuid::Uuid;

#[tokio::test]
async fn create_job_lists_it_with_ordered_skills() {
    let mut fx = hr_fixture();

    let job = fx
        .session
        .create_job(job_payload("Backend Engineer", &["Go", "SQL"]))
        .await
        .expect("create job");

    assert_eq!(job.hr_id, fx.hr.id);
    assert_eq!(job.status.as_deref(), Some("active"));

    let jobs = fx.session.jobs().await.unwrap();
    assert!(jobs.iter().any(|j| j.id == job.id));

    let stored: Vec<(String, i32)> = fx
        .store
        .skills_for_job(job.id)
        .into_iter()
        .map(|s| (s.skill_name, s.priority_level))
        .collect();
    assert_eq!(stored, vec![("Go".to_string(), 1), ("SQL".to_string(), 2)]);
    assert_eq!(fx.session.job_skills(job.id).await.unwrap(), vec!["Go", "SQL"]);

    let note = fx.notifications.recv().await.unwrap();
    assert_eq!(note.title, "Job created");
}

#[tokio::test]
async fn created_job_is_visible_even_after_a_cached_read() {
    let fx = hr_fixture();
    assert!(fx.session.jobs().await.unwrap().is_empty());

    fx.session
        .create_job(job_payload("First", &[]))
        .await
        .unwrap();
    fx.session
        .create_job(job_payload("Second", &[]))
        .await
        .unwrap();

    let titles: Vec<String> = fx
        .session
        .jobs()
        .await
        .unwrap()
        .iter()
        .map(|j| j.title.clone())
        .collect();
    assert_eq!(titles, vec!["Second", "First"]);
    assert_eq!(fx.store.calls(StoreOp::ListJobs), 2);
}

#[tokio::test]
async fn blank_title_is_rejected_before_any_write() {
    let mut fx = hr_fixture();

    let err = fx
        .session
        .create_job(job_payload("  ", &["Go"]))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(fx.store.calls(StoreOp::InsertJob), 0);
    assert_eq!(fx.notifications.recv().await.unwrap().title, "Error");
}

#[tokio::test]
async fn blank_skill_name_is_rejected_before_any_write() {
    let fx = hr_fixture();

    let err = fx
        .session
        .create_job(job_payload("Backend Engineer", &["Go", ""]))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(fx.store.calls(StoreOp::InsertJob), 0);
}

#[tokio::test]
async fn failed_skill_write_rolls_back_the_posting() {
    let mut fx = hr_fixture();
    let before = fx.session.jobs().await.unwrap();
    fx.store.fail_next(StoreOp::InsertSkills, "skills table unavailable");

    let err = fx
        .session
        .create_job(job_payload("Backend Engineer", &["Go"]))
        .await
        .unwrap_err();

    assert_eq!(err, Error::Persistence("skills table unavailable".into()));
    assert_eq!(fx.store.calls(StoreOp::DeleteJob), 1);
    let after = fx.session.jobs().await.unwrap();
    assert_eq!(after, before);
    let (fresh, _rx) = session_for(&fx.store, Some(Principal::hr(fx.hr.id)));
    assert!(fresh.jobs().await.unwrap().is_empty());

    let note = fx.notifications.recv().await.unwrap();
    assert_eq!(note.variant, NotificationVariant::Destructive);
    assert!(note.description.contains("skills table unavailable"));
}

#[tokio::test]
async fn failed_rollback_is_a_partial_write() {
    let fx = hr_fixture();
    fx.store.fail_next(StoreOp::InsertSkills, "skills table unavailable");
    fx.store.fail_next(StoreOp::DeleteJob, "connection lost");

    let err = fx
        .session
        .create_job(job_payload("Backend Engineer", &["Go"]))
        .await
        .unwrap_err();

    match err {
        Error::PartialWrite(msg) => {
            assert!(msg.contains("skills table unavailable"));
            assert!(msg.contains("connection lost"));
        }
        other => panic!("expected partial write, got {:?}", other),
    }
}

#[tokio::test]
async fn applications_are_enriched_with_fallbacks() {
    let fx = hr_fixture();
    let job = fx
        .session
        .create_job(job_payload("Data Engineer", &["Python"]))
        .await
        .unwrap();
    let ann = fx.store.add_profile("Ann", Role::Candidate);
    let ghost = fx.store.add_profile("Ghost", Role::Candidate);

    let scored = fx
        .store
        .add_application(ann.id, job.id, Some("ann/cv.pdf"))
        .unwrap();
    fx.store.add_ats_result(scored.id, Some(0), None).unwrap();
    let orphan = fx.store.add_application(ghost.id, job.id, None).unwrap();
    fx.store.forget_profile(ghost.id);

    let apps = fx.session.applications().await.unwrap();
    assert_eq!(apps.len(), 2);

    // Newest first.
    assert_eq!(apps[0].id, orphan.id);
    assert_eq!(apps[0].candidate_name, UNKNOWN_LABEL);
    assert_eq!(apps[0].ats_score, None);

    assert_eq!(apps[1].candidate_name, "Ann");
    assert_eq!(apps[1].job_title, "Data Engineer");
    assert_eq!(apps[1].ats_score, Some(0));
    assert_eq!(apps[1].status, ApplicationStatus::Applied);
}

#[tokio::test]
async fn status_update_is_visible_and_counted() {
    let mut fx = hr_fixture();
    let job = fx
        .session
        .create_job(job_payload("Backend Engineer", &["Go"]))
        .await
        .unwrap();
    let cand = fx.store.add_profile("Sid", Role::Candidate);
    let app7 = fx.store.add_application(cand.id, job.id, None).unwrap();

    let before = fx.session.stats().await.unwrap();
    assert_eq!(before.accepted, 0);

    let status: ApplicationStatus = "Accepted".parse().unwrap();
    let updated = fx
        .session
        .update_application_status(app7.id, status)
        .await
        .unwrap();
    assert_eq!(updated.status, ApplicationStatus::Accepted);

    let apps = fx.session.applications().await.unwrap();
    let row = apps.iter().find(|a| a.id == app7.id).unwrap();
    assert_eq!(row.status, ApplicationStatus::Accepted);

    let after = fx.session.stats().await.unwrap();
    assert_eq!(after.accepted, before.accepted + 1);
    assert_eq!(after.total_applicants, 1);
    assert_eq!(
        fx.session.job_applicant_counts(job.id).await.unwrap().accepted,
        1
    );

    fx.notifications.recv().await.unwrap();
    assert_eq!(fx.notifications.recv().await.unwrap().title, "Status updated");
}

#[tokio::test]
async fn failed_status_update_leaves_cached_view_unchanged() {
    let mut fx = hr_fixture();
    let job = fx
        .session
        .create_job(job_payload("Backend Engineer", &[]))
        .await
        .unwrap();
    let cand = fx.store.add_profile("Sid", Role::Candidate);
    let app = fx.store.add_application(cand.id, job.id, None).unwrap();
    let before = fx.session.applications().await.unwrap();

    fx.store
        .fail_next(StoreOp::UpdateApplicationStatus, "deadlock detected");
    let result = fx
        .session
        .update_application_status(app.id, ApplicationStatus::Rejected)
        .await;
    assert_err!(result);

    let after = fx.session.applications().await.unwrap();
    assert_eq!(after, before);
    assert_eq!(fx.store.calls(StoreOp::FetchApplications), 1);

    fx.notifications.recv().await.unwrap();
    let note = fx.notifications.recv().await.unwrap();
    assert_eq!(note.title, "Error");
    assert!(note.description.contains("deadlock detected"));
}

#[tokio::test]
async fn delete_job_cascades_and_hides_its_applications() {
    let fx = hr_fixture();
    let keep = fx
        .session
        .create_job(job_payload("Keep", &["Rust"]))
        .await
        .unwrap();
    let job3 = fx
        .session
        .create_job(job_payload("Remove", &["Go", "SQL", "Kafka"]))
        .await
        .unwrap();

    let a = fx.store.add_profile("A", Role::Candidate);
    let b = fx.store.add_profile("B", Role::Candidate);
    let app_a = fx.store.add_application(a.id, job3.id, None).unwrap();
    fx.store.add_application(b.id, job3.id, None).unwrap();
    fx.store.add_ats_result(app_a.id, Some(88), Some("strong")).unwrap();
    fx.store.add_application(a.id, keep.id, None).unwrap();

    assert_eq!(fx.session.applications().await.unwrap().len(), 3);

    assert_ok!(fx.session.delete_job(job3.id).await);

    let jobs = fx.session.jobs().await.unwrap();
    assert!(jobs.iter().all(|j| j.id != job3.id));
    let apps = fx.session.applications().await.unwrap();
    assert_eq!(apps.len(), 1);
    assert!(apps.iter().all(|app| app.job_id != job3.id));

    assert!(!fx.store.job_exists(job3.id));
    assert!(fx.store.skills_for_job(job3.id).is_empty());
    assert!(fx.store.applications_for_job(job3.id).is_empty());
    assert!(fx.store.ats_result_for(app_a.id).is_none());
    assert_eq!(fx.store.skills_for_job(keep.id).len(), 1);
}

#[tokio::test]
async fn deleting_a_missing_job_is_a_persistence_error() {
    let fx = hr_fixture();
    let err = fx.session.delete_job(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, Error::Persistence(_)));
}

#[tokio::test]
async fn status_update_on_concurrently_deleted_job_reports_persistence_error() {
    let fx = hr_fixture();
    let job = fx
        .session
        .create_job(job_payload("Short lived", &[]))
        .await
        .unwrap();
    let cand = fx.store.add_profile("C", Role::Candidate);
    let app = fx.store.add_application(cand.id, job.id, None).unwrap();

    fx.session.delete_job(job.id).await.unwrap();
    let err = fx
        .session
        .update_application_status(app.id, ApplicationStatus::Reviewing)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Persistence(_)));
}

#[tokio::test]
async fn recruiter_without_jobs_gets_no_join_query() {
    let store = Arc::new(MemoryStore::new());
    let hr2 = store.add_profile("Idle Recruiter", Role::Hr);
    let (session, _rx) = session_for(&store, Some(Principal::hr(hr2.id)));

    let apps = session.applications().await.unwrap();

    assert!(apps.is_empty());
    assert_eq!(store.calls(StoreOp::FetchApplications), 0);
    assert_eq!(session.stats().await.unwrap().total_applicants, 0);
}

#[tokio::test]
async fn recruiters_only_see_their_own_data() {
    let fx = hr_fixture();
    let mine = fx
        .session
        .create_job(job_payload("Mine", &[]))
        .await
        .unwrap();

    let other = fx.store.add_profile("Other Recruiter", Role::Hr);
    let (other_session, _rx) = session_for(&fx.store, Some(Principal::hr(other.id)));

    assert!(other_session.jobs().await.unwrap().is_empty());
    let err = other_session.delete_job(mine.id).await.unwrap_err();
    assert!(matches!(err, Error::Persistence(_)));
    assert!(fx.store.job_exists(mine.id));
}

#[tokio::test]
async fn anonymous_session_reads_nothing_and_cannot_write() {
    let store = Arc::new(MemoryStore::new());
    let (session, _rx) = session_for(&store, None);

    assert!(session.jobs().await.unwrap().is_empty());
    assert!(session.applications().await.unwrap().is_empty());
    assert!(session.job_skills(Uuid::new_v4()).await.unwrap().is_empty());
    assert_eq!(store.calls(StoreOp::ListJobs), 0);
    assert_eq!(store.calls(StoreOp::ListSkills), 0);

    let err = session
        .create_job(job_payload("Backend Engineer", &[]))
        .await
        .unwrap_err();
    assert_eq!(err, Error::NotAuthenticated);
    assert_eq!(store.calls(StoreOp::InsertJob), 0);
}

#[tokio::test]
async fn candidates_cannot_post_jobs() {
    let store = Arc::new(MemoryStore::new());
    let cand = store.add_profile("Cand", Role::Candidate);
    let (session, _rx) = session_for(&store, Some(Principal::candidate(cand.id)));

    let err = session
        .create_job(job_payload("Backend Engineer", &[]))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Forbidden(_)));
}

#[tokio::test]
async fn principal_is_resolved_once_per_session() {
    let store = Arc::new(MemoryStore::new());
    let hr = store.add_profile("HR", Role::Hr);
    let mut identity = MockIdentity::new();
    identity
        .expect_current_principal()
        .times(1)
        .returning(move || Ok(Some(Principal::hr(hr.id))));
    let (session, _rx) = DashboardSession::new(store.clone(), Arc::new(identity), common::signer());

    session.jobs().await.unwrap();
    session.applications().await.unwrap();
    session.stats().await.unwrap();
    assert_eq!(
        session.current_principal().await.unwrap(),
        Some(Principal::hr(hr.id))
    );
}

#[tokio::test]
async fn resume_links_are_signed_for_sixty_seconds() {
    let fx = hr_fixture();
    let job = fx
        .session
        .create_job(job_payload("Backend Engineer", &[]))
        .await
        .unwrap();
    let cand = fx.store.add_profile("Ann", Role::Candidate);
    fx.store
        .add_application(cand.id, job.id, Some("ann/cv.pdf"))
        .unwrap();
    let app = fx.session.applications().await.unwrap()[0].clone();

    let mut storage = MockStorage::new();
    storage
        .expect_signed_url()
        .withf(|path, ttl| path.to_string() == "ann/cv.pdf" && *ttl == 60)
        .times(1)
        .returning(|path, _| {
            Ok(Url::parse(&format!("https://files.example.com/{}?signature=x", path)).unwrap())
        });
    let (session, _rx) = DashboardSession::new(
        fx.store.clone(),
        Arc::new(StaticIdentityProvider(Some(Principal::hr(fx.hr.id)))),
        Arc::new(storage),
    );

    let url = session.resume_download_url(&app).await.unwrap().unwrap();
    assert_eq!(url.path(), "/ann/cv.pdf");

    let mut without_resume = app.clone();
    without_resume.resume_url = None;
    assert_eq!(session.resume_download_url(&without_resume).await.unwrap(), None);
}

#[tokio::test]
async fn write_completes_after_the_caller_goes_away() {
    let fx = hr_fixture();
    let store = fx.store.clone();
    let hr_id = fx.hr.id;

    // Poll the mutation once so its write is spawned, then abandon it and
    // tear the session down.
    let pending = tokio::time::timeout(
        Duration::ZERO,
        fx.session.create_job(job_payload("Detached", &["Go"])),
    )
    .await;
    assert!(pending.is_err());
    drop(fx);

    for _ in 0..100 {
        if store.calls(StoreOp::InsertSkills) == 1 {
            break;
        }
        tokio::task::yield_now().await;
    }

    let (fresh, _rx) = session_for(&store, Some(Principal::hr(hr_id)));
    let jobs = fresh.jobs().await.unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(fresh.job_skills(jobs[0].id).await.unwrap(), vec!["Go"]);
}
