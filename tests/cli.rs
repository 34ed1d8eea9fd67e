mod common;

use std::process::ExitCode;

use common::{MutexService, TOKEN};
use mutex_lease::{
    cli::{self, MutexCommand},
    interface::report::LockOutput,
    ClientConfig,
};

async fn run(service: &MutexService, command: MutexCommand) -> ExitCode {
    let config = ClientConfig::new(&service.start().await).unwrap();
    cli::run(command, &config).await.unwrap()
}

#[tokio::test]
async fn lock_in_token_mode_succeeds() {
    let service = MutexService::default();
    let code = run(
        &service,
        MutexCommand::Lock {
            name: "db".to_string(),
            output: LockOutput::Token,
            timeout: 0,
        },
    )
    .await;
    assert_eq!(code, ExitCode::SUCCESS);
}

#[tokio::test]
async fn contended_lock_exits_non_zero() {
    let service = MutexService::default();
    service.configure(|state| state.busy_for = 1);
    let code = run(
        &service,
        MutexCommand::Lock {
            name: "db".to_string(),
            output: LockOutput::Json,
            timeout: 0,
        },
    )
    .await;
    assert_eq!(code, ExitCode::FAILURE);
}

#[tokio::test]
async fn rejected_unlock_exits_non_zero() {
    let service = MutexService::default();
    service.configure(|state| state.unlock_rejected = true);
    let code = run(
        &service,
        MutexCommand::Unlock {
            name: "db".to_string(),
            token: TOKEN.to_string(),
        },
    )
    .await;
    assert_eq!(code, ExitCode::FAILURE);
    assert_eq!(service.count("unlock"), 1);
}

#[tokio::test]
async fn refresh_and_get_succeed() {
    let service = MutexService::default();
    let refresh = run(
        &service,
        MutexCommand::Refresh {
            name: "db".to_string(),
            token: TOKEN.to_string(),
        },
    )
    .await;
    let get = run(
        &service,
        MutexCommand::Get {
            name: "db".to_string(),
        },
    )
    .await;
    assert_eq!(refresh, ExitCode::SUCCESS);
    assert_eq!(get, ExitCode::SUCCESS);
}
