fn main() -> anyhow::Result<()> {
    xrview::app::run()
}
