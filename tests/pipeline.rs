// tests/pipeline.rs
use chrono::NaiveDate;

use gw_crawl::assemble::crawl;
use gw_crawl::config::consts::*;
use gw_crawl::config::options::{CrawlOptions, FileOptions};
use gw_crawl::core::MemoryFetcher;
use gw_crawl::ledger::{Ledger, HEADER};
use gw_crawl::model::{EventType, SlotStatus, SlotType};
use gw_crawl::registry::Registries;
use gw_crawl::specs::listing::ThreadWalker;
use gw_crawl::store;
use gw_crawl::tables::Tables;

const THREAD_PAGE: &str = r#"<html><head><title>Gruppe W :: Events</title></head>
<body>
<table class='tbl-border forum_thread_table'>
<tr>
<td class='forum_thread_title'><!--forum_thread_title--><strong>{title}</strong></td>
</tr>
</table>
<table>
<tr>
<td class='tbl2 forum_thread_user_name' style='width:140px'><!--forum_thread_user_name-->{creator}</td>
<td class='tbl2 forum_thread_post_date'>
<span class='small'>
<a href='#post_{post}' name='post_{post}' id='post_{post}'>#1</a>
Geschrieben am 12.09.2014 19:22</span>
</td>
</tr>
<tr>
<td class='tbl1 forum_thread_post_body'>
<div class='post_message'>
{body}
</div><!--sub_forum_post_message-->
</td>
</tr>
</table>
</body></html>"#;

const KAPUTT_BODY: &str = "\
Eventbeginn: 19:30 Uhr<br />
Map: Imrali<br />
<strong>Slotliste:</strong><br />
#1 - Commanding Officer - <strong>Zabuza</strong><br />
#2 - Rifleman - <strong>Rallen95</strong><br />
#3 - Machine Gunner - <strong>Hoffi</strong><br />";

const JTAC_BODY: &str = "\
Treffen im TS: 18:45<br />
Wir ueben Luftnahunterstuetzung.<br />";

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn thread_url(id: u32) -> String {
    format!("{SERVER_PATH}viewthread.php?thread_id={id}")
}

fn listing_url(opts: &CrawlOptions, offset: usize) -> String {
    format!("{}{ROWSTART_PARAM}{offset}", opts.listing_url())
}

fn thread(title: &str, creator: &str, post: u32, body: &str) -> String {
    THREAD_PAGE
        .replace("{title}", title)
        .replace("{creator}", creator)
        .replace("{post}", &post.to_string())
        .replace("{body}", body)
}

fn listing(ids: &[u32]) -> String {
    let mut out = vec![s("<html><body>"), s(LISTING_START)];
    out.push(s("<td class='tbl2'><img src='sticky.gif' alt='Thema gepinnt' /></td>"));
    out.extend((0..PINNED_SKIP).map(|k| format!("<td>{k}</td>")));
    for id in ids {
        out.push(format!("<td class='tbl1'><a href='viewthread.php?thread_id={id}' class='forum_thread'>x</a></td>"));
        out.extend((0..THREAD_SKIP).map(|k| format!("<td>{k}</td>")));
    }
    out.push(s(LISTING_END));
    out.push(s("</body></html>"));
    out.join("\n")
}

fn empty_listing() -> String {
    [LISTING_START, "<td>Keine Themen</td>", LISTING_END].join("\n")
}

fn s(x: &str) -> String {
    x.to_owned()
}

fn forum(opts: &CrawlOptions) -> MemoryFetcher {
    let mut f = MemoryFetcher::new();
    f.insert(listing_url(opts, 0), &listing(&[101, 102, 103]));
    f.insert(listing_url(opts, opts.page_size), &empty_listing());
    f.insert(thread_url(101), &thread("[21.07.2013] Co30 - Operation Kaputt", "Zabuza", 48213, KAPUTT_BODY));
    f.insert(thread_url(102), &thread("[23.09.] - 1900 - JTAC-Training", "Rallen", 51877, JTAC_BODY));
    f.insert(thread_url(103), &thread("20.07 Massentest Desert Storm", "Zabuza", 47001, "Alle da?<br />"));
    f
}

fn ledger() -> Ledger {
    let sheet = format!("{HEADER};CO;\n;;;;21.07.2013;\nRallen;;01.01.2013;;a;\nZabuza;;01.01.2013;;s;\n");
    Ledger::parse(&sheet).unwrap().value
}

#[test]
fn discovery_stops_at_the_first_empty_page() {
    let opts = CrawlOptions { page_size: 5, ..CrawlOptions::default() };
    let mut f = MemoryFetcher::new();
    f.insert(listing_url(&opts, 0), &listing(&[1, 2, 3, 4, 5]));
    f.insert(listing_url(&opts, 5), &listing(&[6, 7, 8, 9, 10]));
    f.insert(listing_url(&opts, 10), &empty_listing());

    let found: Vec<String> = ThreadWalker::new(&mut f, &opts).collect::<Result<_, _>>().unwrap();
    assert_eq!(found.len(), 10);
    assert_eq!(found[0], thread_url(1));
    assert_eq!(found[9], thread_url(10));
    // nothing past the empty page was asked for
    assert_eq!(f.requests().len(), 3);
}

#[test]
fn crawl_reconciles_with_the_ledger() {
    let opts = CrawlOptions::default();
    let mut f = forum(&opts);
    let tables = Tables::embedded().unwrap();
    let ledger = ledger();

    let got = crawl(&mut f, &opts, &tables, Some(&ledger), ymd(2015, 1, 1), None).unwrap();
    let events: Vec<_> = got.value.iter().collect();
    assert_eq!(events.len(), 2);

    let kaputt = events[0];
    assert_eq!(kaputt.event_type, EventType::Coop);
    assert_eq!(kaputt.map, "Imrali Island");
    let slots = kaputt.roster.slots();
    assert_eq!(slots[1].player, "Rallen");
    assert_eq!(slots[1].status, SlotStatus::Appeared);
    assert_eq!(slots[0].status, SlotStatus::SignedOutLate);
    assert_eq!(slots[2].role, SlotType::Mg);

    let jtac = events[1];
    assert_eq!(jtac.date, ymd(2014, 9, 23));
    assert_eq!(jtac.event_type, EventType::Orga);
    assert_eq!(jtac.creator, "Rallen");
    assert_eq!(jtac.thread_id, Some(102));
    assert_eq!(jtac.post_id, 51877);
    assert!(jtac.roster.is_empty());
}

#[test]
fn snapshot_and_ledger_survive_a_round_trip() {
    let opts = CrawlOptions::default();
    let mut f = forum(&opts);
    let tables = Tables::embedded().unwrap();
    let ledger = ledger();
    let events = crawl(&mut f, &opts, &tables, Some(&ledger), ymd(2015, 1, 1), None).unwrap().value;

    let dir = tempfile::tempdir().unwrap();
    let files = FileOptions {
        snapshot: dir.path().join(".store").join(SNAPSHOT_FILE),
        players_seed: dir.path().join("players.csv"),
        maps_seed: dir.path().join("maps.csv"),
        ..FileOptions::default()
    };
    std::fs::write(&files.players_seed, "12;Hoffi\n7;Rallen\n").unwrap();

    let mut reg = store::load_registries(&files).unwrap();
    store::save_snapshot(&events, &mut reg, &files.snapshot).unwrap();

    let mut fresh = Registries::new();
    let back = store::load_snapshot(&mut fresh, &files.snapshot).unwrap();
    assert!(back.is_clean(), "{:?}", back.warnings);
    assert_eq!(back.value, events);
    assert_eq!(fresh.players.id_of(&s("Hoffi")), Some(12));
    // creators and slot holders without a seeded id stay unregistered
    assert_eq!(fresh.players.id_of(&s("Zabuza")), None);
    assert_eq!(fresh.players.len(), 2);

    let out = dir.path().join("ledger_out.csv");
    store::save_ledger(&back.value, Some(&ledger), &reg, &out).unwrap();
    let reread = Ledger::parse(&std::fs::read_to_string(&out).unwrap()).unwrap().value;
    assert_eq!(reread.event_count(), 2);
    let coop = reread.get(ymd(2013, 7, 21)).unwrap();
    assert_eq!(coop.status("Rallen"), Some(SlotStatus::Appeared));
    assert_eq!(coop.status("Zabuza"), None);
    // registered but without player columns
    assert_eq!(coop.status("Hoffi"), None);
    assert_eq!(reread.get(ymd(2014, 9, 23)).unwrap().event_type, EventType::Orga);
}
