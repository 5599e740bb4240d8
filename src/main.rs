fn main() -> anyhow::Result<()> {
    maptool_rust::run()
}
