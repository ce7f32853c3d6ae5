//! Drives one engine invocation end to end: input feed -> run generation ->
//! sequential per-key merges -> sinks (spec §4.5).

use crate::config::EngineConfig;
use crate::error::SortError;
use crate::key::KeyKind;
use crate::merger;
use crate::run_generator::RunGenerator;
use log::info;
use std::io::BufRead;
use std::time::Instant;

/// One output destination per key. Each closure is invoked once per merged
/// line, in order, for its key's merge.
pub struct Sinks<'a> {
    pub id: Box<dyn FnMut(&str) -> anyhow::Result<()> + 'a>,
    pub name: Box<dyn FnMut(&str) -> anyhow::Result<()> + 'a>,
    pub continent: Box<dyn FnMut(&str) -> anyhow::Result<()> + 'a>,
}

/// Runs the engine: reads lines from `source`, generates runs, merges each
/// key in sequence (id, then name, then continent, to cap peak memory), and
/// removes the run files once every merge has completed successfully.
pub fn run<R>(config: &EngineConfig, source: R, mut sinks: Sinks<'_>) -> Result<(), SortError>
where
    R: BufRead + Send + 'static,
{
    std::fs::create_dir_all(&config.run_dir)
        .map_err(|e| SortError::io("run-generation", &config.run_dir, e))?;

    let start = Instant::now();
    let (handle, rx) = crate::input::spawn_line_reader(source, config.input_channel_capacity);

    let generator = RunGenerator::new(config);
    let run_set = generator.generate(rx.iter())?;

    match handle.join() {
        Ok(Ok(())) => {}
        Ok(Err(e)) => return Err(SortError::io("input-feed", &config.run_dir, e)),
        Err(_) => return Err(SortError::ChannelClosedEarly),
    }

    merger::merge(
        &run_set.id_runs,
        KeyKind::Id,
        config.merge_reader_buffer_bytes,
        |line| (sinks.id)(line),
    )?;
    merger::merge(
        &run_set.name_runs,
        KeyKind::Name,
        config.merge_reader_buffer_bytes,
        |line| (sinks.name)(line),
    )?;
    merger::merge(
        &run_set.continent_runs,
        KeyKind::Continent,
        config.merge_reader_buffer_bytes,
        |line| (sinks.continent)(line),
    )?;

    merger::cleanup_run_files(&run_set.id_runs);
    merger::cleanup_run_files(&run_set.name_runs);
    merger::cleanup_run_files(&run_set.continent_runs);

    info!("orchestration: completed full sort in {:.2?}", start.elapsed());
    Ok(())
}
