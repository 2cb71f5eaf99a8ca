// src/assemble.rs
//! Turns thread pages into [`Event`]s and drives the whole crawl.

use chrono::NaiveDate;
use thiserror::Error;

use crate::config::consts::PROGRESS_EVERY;
use crate::config::options::CrawlOptions;
use crate::core::{Fetch, FetchError};
use crate::diag::{Extracted, Warning};
use crate::ledger::Ledger;
use crate::model::{Event, EventList};
use crate::progress::Progress;
use crate::specs::listing::{ListingError, ThreadWalker};
use crate::specs::roster::{self, RosterContext};
use crate::specs::thread::{self, ThreadError};
use crate::specs::{body, title};
use crate::tables::Tables;

#[derive(Debug, Error)]
pub enum CrawlError {
    #[error(transparent)]
    Listing(#[from] ListingError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// One thread page to one event.
///
/// `Ok(None)` means the thread is no event: it is on the not-an-event list, or
/// its date could not be resolved (then a [`Warning::ThreadSkipped`] says so).
/// Structural misses are errors.
pub fn assemble_event(
    url: &str,
    lines: &[String],
    tables: &Tables,
    ledger: Option<&Ledger>,
    today: NaiveDate,
) -> Result<Extracted<Option<Event>>, ThreadError> {
    let anchors = thread::locate(lines)?;
    let name_of_thread = anchors.title.as_str();
    let overrides = &tables.titles;

    if overrides.is_not_event(name_of_thread) {
        logd!("Not an event: {name_of_thread}");
        return Ok(Extracted::clean(None));
    }

    let mut warnings = Vec::new();
    let date = title::date(name_of_thread, anchors.posted_at(lines), overrides, today).collect_into(&mut warnings);
    let Some(date) = date else {
        warnings.push(Warning::ThreadSkipped { url: s!(url), reason: s!("no event date") });
        return Ok(Extracted { value: None, warnings });
    };

    let event_type = title::event_type(name_of_thread, overrides).collect_into(&mut warnings);
    let size = title::size(name_of_thread, overrides).collect_into(&mut warnings);
    let thread_id = body::thread_id(url).collect_into(&mut warnings);

    let post = anchors.body(lines);
    let time = body::start_time(post, name_of_thread).collect_into(&mut warnings);
    let map = body::map(post, tables);
    let name = title::name(name_of_thread, overrides).collect_into(&mut warnings);

    let ctx = RosterContext {
        title: name_of_thread,
        size,
        event_type,
        date,
        ledger: ledger.and_then(|l| l.get(date)),
        tables,
        today,
    };
    let roster = roster::extract(post, &ctx)?.collect_into(&mut warnings);

    let event = Event {
        name,
        event_type,
        size,
        creator: anchors.creator.clone(),
        map,
        date,
        time,
        thread_id,
        post_id: anchors.post_id,
        roster,
    };
    Ok(Extracted { value: Some(event), warnings })
}

/// Walk the listing, then fetch and assemble every thread in listing order.
///
/// A thread that cannot be assembled is skipped with a warning; a page that
/// cannot be fetched ends the crawl.
pub fn crawl<F: Fetch + ?Sized>(
    fetch: &mut F,
    opts: &CrawlOptions,
    tables: &Tables,
    ledger: Option<&Ledger>,
    today: NaiveDate,
    mut progress: Option<&mut dyn Progress>,
) -> Result<Extracted<EventList>, CrawlError> {
    let urls: Vec<String> = ThreadWalker::new(fetch, opts).collect::<Result<_, _>>()?;
    let total = urls.len();
    logf!("Found {total} event threads");

    if let Some(p) = progress.as_deref_mut() {
        p.begin(total);
    }

    let mut events = EventList::with_capacity(total);
    let mut warnings = Vec::new();
    let mut outcome = Ok(());

    for (i, url) in urls.iter().enumerate() {
        let lines = match fetch.fetch_lines(url) {
            Ok(lines) => lines,
            Err(e) => {
                outcome = Err(e);
                break;
            }
        };

        match assemble_event(url, &lines, tables, ledger, today) {
            Ok(got) => {
                if let Some(event) = got.collect_into(&mut warnings) {
                    events.push(event);
                }
                if let Some(p) = progress.as_deref_mut() {
                    p.item_done(i);
                }
            }
            Err(e) => {
                warnings.push(Warning::ThreadSkipped { url: url.clone(), reason: e.to_string() });
                if let Some(p) = progress.as_deref_mut() {
                    p.item_failed(i, url);
                }
            }
        }

        if (i + 1) % PROGRESS_EVERY == 0 {
            if let Some(p) = progress.as_deref_mut() {
                p.log(&format!("{} of {total} events", i + 1));
            }
        }
    }

    if let Some(p) = progress.as_deref_mut() {
        p.finish();
    }
    outcome?;

    Ok(Extracted { value: events, warnings })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::consts::*;
    use crate::core::MemoryFetcher;
    use crate::ledger::HEADER;
    use crate::model::{EventType, SlotStatus, SlotType};
    use crate::specs::listing::fixtures::{listing, page_url};
    use crate::specs::thread::fixtures::page;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        ymd(2015, 1, 1)
    }

    fn thread_url(id: u32) -> String {
        format!("{SERVER_PATH}viewthread.php?thread_id={id}")
    }

    const TITLE: &str = "[21.07.2013] Co30 - Operation Kaputt";

    const BODY: &str = "\
Eventbeginn: 19:30 Uhr<br />
Map: Imrali<br />
<strong>Slotliste:</strong><br />
#1 - Commanding Officer - <strong>Zabuza</strong><br />
#2 - Rifleman - <strong>Rallen95</strong><br />";

    #[derive(Default)]
    struct Recorder {
        begun: Option<usize>,
        done: Vec<usize>,
        failed: Vec<usize>,
        lines: Vec<String>,
        finished: bool,
    }

    impl Progress for Recorder {
        fn begin(&mut self, total: usize) {
            self.begun = Some(total);
        }
        fn log(&mut self, msg: &str) {
            self.lines.push(s!(msg));
        }
        fn item_done(&mut self, index: usize) {
            self.done.push(index);
        }
        fn item_failed(&mut self, index: usize, _url: &str) {
            self.failed.push(index);
        }
        fn finish(&mut self) {
            self.finished = true;
        }
    }

    #[test]
    fn assembles_every_field() {
        let tables = Tables::embedded().unwrap();
        let lines = page(TITLE, "Zabuza", BODY);
        let got = assemble_event(&thread_url(77), &lines, &tables, None, today()).unwrap();
        let e = got.value.unwrap();

        assert_eq!(e.name, "Operation Kaputt");
        assert_eq!(e.event_type, EventType::Coop);
        assert_eq!(e.size, Some(30));
        assert_eq!(e.creator, "Zabuza");
        assert_eq!(e.map, "Imrali Island");
        assert_eq!(e.date, ymd(2013, 7, 21));
        assert_eq!(e.time, chrono::NaiveTime::from_hms_opt(19, 30, 0));
        assert_eq!(e.thread_id, Some(77));
        assert_eq!(e.post_id, 48213);
        assert_eq!(e.roster.slot_count(), 2);
        assert_eq!(e.roster.slots()[0].role, SlotType::Co);
        assert_eq!(e.roster.slots()[1].player, "Rallen");

        // nothing in the ledger for a past date
        assert_eq!(got.warnings.len(), 1);
        assert!(matches!(got.warnings[0], Warning::LedgerMissingEvent { .. }));
    }

    #[test]
    fn ledger_status_reaches_the_slot() {
        let tables = Tables::embedded().unwrap();
        let sheet = format!("{HEADER};CO;\n;;;;21.07.2013;\nRallen;;01.01.2013;;a;\nZabuza;;01.01.2013;;t;\n");
        let ledger = Ledger::parse(&sheet).unwrap().value;

        let lines = page(TITLE, "Zabuza", BODY);
        let got = assemble_event(&thread_url(77), &lines, &tables, Some(&ledger), today()).unwrap();
        assert!(got.is_clean(), "{:?}", got.warnings);
        let slots = got.value.unwrap().roster.slots().to_vec();
        assert_eq!(slots[0].status, SlotStatus::PreparedLate);
        assert_eq!(slots[1].player, "Rallen");
        assert_eq!(slots[1].status, SlotStatus::Appeared);
    }

    #[test]
    fn not_an_event_and_undated_threads_yield_nothing() {
        let tables = Tables::embedded().unwrap();
        let lines = page("20.07 Massentest Desert Storm", "Zabuza", BODY);
        let got = assemble_event(&thread_url(1), &lines, &tables, None, today()).unwrap();
        assert_eq!(got, Extracted::clean(None));

        let lines = page("Stammtisch", "Zabuza", BODY);
        let got = assemble_event(&thread_url(2), &lines, &tables, None, today()).unwrap();
        assert!(got.value.is_none());
        assert!(matches!(got.warnings.last(), Some(Warning::ThreadSkipped { .. })));
    }

    #[test]
    fn crawl_skips_broken_threads_and_reports_progress() {
        let tables = Tables::embedded().unwrap();
        let mut f = MemoryFetcher::new();
        let ids: Vec<u32> = (1..=11).collect();
        f.insert(page_url(0), &listing(1, &ids));
        f.insert(page_url(20), &listing(0, &[]));
        for id in &ids {
            let html = if *id == 4 {
                s!("<html>broken</html>")
            } else {
                page(TITLE, "Zabuza", BODY).join("\n")
            };
            f.insert(thread_url(*id), &html);
        }

        let mut rec = Recorder::default();
        let got = crawl(&mut f, &CrawlOptions::default(), &tables, None, today(), Some(&mut rec)).unwrap();

        assert_eq!(got.value.len(), 10);
        assert!(got.warnings.iter().any(|w| matches!(w, Warning::ThreadSkipped { url, .. } if url.ends_with("=4"))));
        assert_eq!(rec.begun, Some(11));
        assert_eq!(rec.failed, vec![3]);
        assert_eq!(rec.done.len(), 10);
        assert_eq!(rec.lines, vec![s!("10 of 11 events")]);
        assert!(rec.finished);
    }

    #[test]
    fn fetch_failure_ends_the_crawl() {
        let tables = Tables::embedded().unwrap();
        let mut f = MemoryFetcher::new();
        f.insert(page_url(0), &listing(0, &[1]));
        f.insert(page_url(20), &listing(0, &[]));

        let mut rec = Recorder::default();
        let err = crawl(&mut f, &CrawlOptions::default(), &tables, None, today(), Some(&mut rec)).unwrap_err();
        assert!(matches!(err, CrawlError::Fetch(_)));
        assert!(rec.finished);
    }
}
