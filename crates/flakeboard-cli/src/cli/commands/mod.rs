use super::args::Cli;

pub(crate) mod report;

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    report::run(cli.report).await
}
