//! Login tests against the live practice site through Playwright.
//!
//! Needs node and `npx playwright install`. Run with:
//! cargo test --package playbill-e2e --test login -- --ignored

use std::sync::Arc;

use playbill_common::Settings;
use playbill_e2e::pages::{logged_in_page, login_page};
use playbill_e2e::screenplay::{CurrentUrl, Login, Retried, Text, Visibility};
use playbill_e2e::{Actor, BrowseTheWeb, PlaywrightConfig, PlaywrightPage};

async fn browsing_actor(settings: &Settings) -> Actor {
    let page = PlaywrightPage::verified(PlaywrightConfig::from(&settings.browser))
        .await
        .expect("Playwright is installed");
    Actor::new("Tester").who_can(BrowseTheWeb::using(Arc::new(page)))
}

#[tokio::test]
#[ignore = "drives a real browser"]
async fn smoke_valid_user_logs_in() {
    let settings = Settings::from_env().unwrap();
    let actor = browsing_actor(&settings).await;

    let login = Retried::interaction(
        Login::with_valid_credentials(&settings),
        settings.test.retry_policy(),
    );
    actor.attempts_to(&[&login]).await.unwrap();

    assert!(actor.asks(&CurrentUrl).await.unwrap().contains(logged_in_page::URL_PATH));
    assert!(actor.asks(&Visibility::of(logged_in_page::LOGOUT_LINK)).await.unwrap());
}

#[tokio::test]
#[ignore = "drives a real browser"]
async fn invalid_user_sees_error() {
    let settings = Settings::from_env().unwrap();
    let actor = browsing_actor(&settings).await;

    actor
        .attempts_to(&[&Login::with_invalid_credentials(&settings)])
        .await
        .unwrap();

    assert_eq!(
        actor.asks(&Text::of(login_page::ERROR_MESSAGE)).await.unwrap(),
        "Your username is invalid!"
    );
}
