//! The Judgement Orchestrator (C9): fetches one submission, compiles
//! the checker and the submission, and runs every test case through a
//! single [`judge_sandbox::Supervisor`], aggregating the worst verdict
//! seen across cases.
//!
//! Grounded on the original `Judgement` state machine (compile checker
//! -> compile submission -> run+compare each test case) and the
//! WJ -> Fetching -> Compiling -> Executing progression the original
//! judge loop drove a submission through. Unlike that loop, this
//! module makes no database calls of its own: it is handed a
//! [`DataSource`] and leaves persistence entirely to the caller.

use crate::data::{DataSource, Verdict};
use crate::language::{self, LanguageRegistry, LanguageSpec};
use crate::prelude::*;
use crate::RunLimit;
use judge_sandbox::{RunRequest, RunResult, Status, Supervisor};

/// Checker runs get a fixed 30s budget regardless of the submission's
/// own time limit (spec.md §4.9 step 3).
const CHECKER_TIME_LIMIT: f64 = 30.0;

/// Run one [`RunRequest`] through `sup`, cleaning the staging
/// directory first as spec.md §4.6 requires ("each `comm` is preceded
/// by a `clean`").
fn step(sup: &mut Supervisor, req: &RunRequest, files_dir: &Path) -> Result<RunResult> {
    sup.clean()?;
    Ok(sup.comm(req, files_dir)?)
}

/// Maps a non-`OK` run of the submission itself to the verdict it
/// implies; `OK` defers to the checker.
fn verdict_of(result: &RunResult) -> Option<Verdict> {
    match result.status {
        Status::Ok => None,
        Status::Tle => Some(Verdict::Tle),
        Status::Re => Some(Verdict::Re),
        Status::Ie => Some(Verdict::Ie),
    }
}

/// Maps a finished checker run to the per-case verdict (spec.md §4.9
/// step 3: "OK→AC, RE→WA, TLE→ITLE, anything else→IE").
fn checker_verdict(result: &RunResult) -> Verdict {
    match result.status {
        Status::Ok => Verdict::Ac,
        Status::Re => Verdict::Wa,
        Status::Tle => Verdict::Itle,
        Status::Ie => Verdict::Ie,
    }
}

/// Compile `lang`'s `source_name` (already staged at `run_dir`) and
/// stage its declared `objects` plus a captured-stderr file back out.
/// Returns the compile step's [`RunResult`]; the caller decides what a
/// non-`OK` result means (`CE` for the submission, `ICE` for the
/// checker).
fn compile(
    sup: &mut Supervisor,
    lang: &LanguageSpec,
    compiler_limit: &RunLimit,
    extra_send_files: &[String],
    stderr_file: &str,
    run_dir: &Path,
) -> Result<RunResult> {
    let mut send_files = vec![lang.source_name.clone()];
    send_files.extend_from_slice(extra_send_files);

    let mut get_files = lang.objects.clone();
    get_files.push(stderr_file.to_owned());

    let req = RunRequest::new(lang.compile.join(" "), compiler_limit.time.as_secs_f64())
        .overlay(false)
        .stderr(stderr_file)
        .send_files(send_files)
        .get_files(get_files);
    step(sup, &req, run_dir)
}

#[allow(clippy::too_many_arguments)]
fn judge(
    languages: &LanguageRegistry,
    compiler_limit: &RunLimit,
    executor_dir: &Path,
    solution_id: &str,
    oj_data: &mut dyn DataSource,
    run_dir: &Path,
    old_verdict: &mut Option<Verdict>,
    max_time: &mut Duration,
    max_memory: &mut i64,
) -> Result<Verdict> {
    let d = oj_data.fetch(solution_id)?;
    *old_verdict = d.old_result;

    let lang = language::lookup(languages, &d.language)?;
    let checker_lang = language::lookup(languages, &d.checker_language)?;

    debug!("saving source code to {}", run_dir.join(&lang.source_name).display());
    std::fs::write(run_dir.join(&lang.source_name), &d.source).map_err(Error::IOError)?;
    std::fs::write(
        run_dir.join(&checker_lang.source_name),
        &d.checker_source,
    )
    .map_err(Error::IOError)?;

    let mut checker_extra = Vec::new();
    if let Some(testlib) = &d.testlib {
        std::fs::write(run_dir.join("testlib.h"), testlib).map_err(Error::IOError)?;
        checker_extra.push("testlib.h".to_string());
    }

    let worker_exe = executor_dir.join("executor");
    let sandbox_dir = run_dir.join("sandbox");
    let mut sup = Supervisor::spawn(&worker_exe, &sandbox_dir)?;

    info!("compiling the checker");
    let checker_compile = compile(
        &mut sup,
        checker_lang,
        compiler_limit,
        &checker_extra,
        "ice.txt",
        run_dir,
    )?;
    if checker_compile.is_failed() {
        info!("checker compilation failed");
        return finish(sup, Verdict::Ice);
    }

    info!("compiling the submission");
    let user_compile = compile(&mut sup, lang, compiler_limit, &[], "ce.txt", run_dir)?;
    if user_compile.is_failed() {
        info!("compilation failed");
        return finish(sup, Verdict::Ce);
    }

    let inp = run_dir.join("input.txt");
    let judgep = run_dir.join("judge.txt");
    let mut overall = Verdict::Ac;
    *max_time = Duration::new(0, 0);
    *max_memory = 0;

    for (cnt, (tin, tout)) in d.testcases.iter().enumerate() {
        let test_name = tin
            .file_name()
            .and_then(|x| x.to_str())
            .unwrap_or("[bad filename]");
        info!("testing testcase {} ({})", cnt + 1, test_name);

        std::fs::copy(tin, &inp).map_err(Error::IOError)?;
        std::fs::copy(tout, &judgep).map_err(Error::IOError)?;

        let mut run_send_files = lang.objects.clone();
        run_send_files.push("input.txt".to_string());
        let run_req = RunRequest::new(lang.exec.join(" "), d.time_limit.as_secs_f64())
            .overlay(true)
            .stdin("input.txt")
            .stdout("contestant.txt")
            .stderr("re.txt")
            .send_files(run_send_files)
            .get_files(["contestant.txt".to_string(), "re.txt".to_string()]);
        let run_result = step(&mut sup, &run_req, run_dir)?;
        *max_time = (*max_time).max(Duration::from_secs_f64(run_result.cpu_time_seconds.max(0.0)));
        *max_memory = (*max_memory).max(run_result.peak_memory_bytes);
        info!(
            "{} seconds, {} bytes used for test {}",
            run_result.cpu_time_seconds, run_result.peak_memory_bytes, cnt + 1
        );

        let case_verdict = if let Some(v) = verdict_of(&run_result) {
            v
        } else {
            let checker_exec = language::expand(
                &checker_lang.exec,
                &[
                    ("input", "input.txt"),
                    ("judge", "judge.txt"),
                    ("contestant", "contestant.txt"),
                ],
            );
            let mut checker_send_files = checker_lang.objects.clone();
            checker_send_files.extend([
                "input.txt".to_string(),
                "judge.txt".to_string(),
                "contestant.txt".to_string(),
            ]);
            let checker_req = RunRequest::new(checker_exec.join(" "), CHECKER_TIME_LIMIT)
                .overlay(true)
                .stderr("checker.txt")
                .send_files(checker_send_files)
                .get_files(["checker.txt".to_string()]);
            let checker_result = step(&mut sup, &checker_req, run_dir)?;
            checker_verdict(&checker_result)
        };
        info!("testcase {} -> {:?}", cnt + 1, case_verdict);
        overall = overall.max(case_verdict);
    }

    finish(sup, overall)
}

fn finish(sup: Supervisor, verdict: Verdict) -> Result<Verdict> {
    sup.last()?;
    Ok(verdict)
}

pub fn judge_feedback(
    languages: &LanguageRegistry,
    compiler_limit: &RunLimit,
    executor_dir: &Path,
    dry: bool,
    solution_id: &str,
    oj_data: &mut dyn DataSource,
    run_dir: &Path,
) -> Result<()> {
    create_dir_all(run_dir).map_err(Error::IOError)?;
    let run_dir = run_dir.canonicalize().map_err(Error::IOError)?;

    let mut old_verdict = None;
    let mut max_time = Duration::new(0, 0);
    let mut max_memory: i64 = 0;

    let r = judge(
        languages,
        compiler_limit,
        executor_dir,
        solution_id,
        oj_data,
        &run_dir,
        &mut old_verdict,
        &mut max_time,
        &mut max_memory,
    );

    if let (Ok(v), Some(u)) = (&r, &old_verdict) {
        if v != u {
            warn!("verdict changed from {:?} to {:?}", u, v);
        }
    }
    if let Err(ref e) = r {
        error!("judgement failed: {}", e);
    }
    let r = r.unwrap_or(Verdict::Ie);
    info!("verdict = {:?}, max_memory = {} bytes", r, max_memory);

    if dry {
        return Ok(());
    }

    oj_data.feedback(solution_id, r, max_time)?;

    let ce = util::clamp_feedback(run_dir.join("ce.txt"))?;
    oj_data.feedback_ce(solution_id, ce)?;

    let log = if r == Verdict::Wa {
        util::combined_feedback(
            run_dir.join("judge.log"),
            "\nChecker Output:\n",
            run_dir.join("checker.txt"),
        )?
    } else if r == Verdict::Ice {
        util::combined_feedback(
            run_dir.join("judge.log"),
            "\nChecker Compile Output:\n",
            run_dir.join("ice.txt"),
        )?
    } else {
        util::clamp_feedback(run_dir.join("judge.log"))?
    };
    oj_data.feedback_log(solution_id, log)?;

    Ok(())
}
