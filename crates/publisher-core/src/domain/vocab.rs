//! Vocabulary - 固定の述語・型・ステータス URI
//!
//! ここにある URI を変更すると既存データとの互換性が壊れます。

/// 処理対象タスクの operation（inclusion filter）
pub const TASK_OPERATION: &str =
    "http://lblod.data.gift/id/jobs/concept/TaskOperation/decide-publish";

pub const STATUS_SCHEDULED: &str = "http://redpencil.data.gift/id/concept/JobStatus/scheduled";
pub const STATUS_BUSY: &str = "http://redpencil.data.gift/id/concept/JobStatus/busy";
pub const STATUS_SUCCESS: &str = "http://redpencil.data.gift/id/concept/JobStatus/success";
pub const STATUS_FAILED: &str = "http://redpencil.data.gift/id/concept/JobStatus/failed";

pub const TASK_TYPE: &str = "http://redpencil.data.gift/vocabularies/tasks/Task";
pub const ERROR_TYPE: &str = "http://open-services.net/ns/core#Error";

pub const ERROR_URI_PREFIX: &str = "http://redpencil.data.gift/id/jobs/error/";
pub const DATA_CONTAINER_URI_PREFIX: &str = "http://redpencil.data.gift/id/dataContainers/";

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

pub const XSD_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
pub const XSD_DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";

/// 共有ストレージ上のファイル locator の scheme
pub const SHARE_SCHEME: &str = "share://";

/// タスク系クエリで共通に使う PREFIX 宣言
pub const PREFIXES: &str = "\
PREFIX harvesting: <http://lblod.data.gift/vocabularies/harvesting/>
PREFIX terms: <http://purl.org/dc/terms/>
PREFIX prov: <http://www.w3.org/ns/prov#>
PREFIX nie: <http://www.semanticdesktop.org/ontologies/2007/01/19/nie#>
PREFIX ext: <http://mu.semte.ch/vocabularies/ext/>
PREFIX mu: <http://mu.semte.ch/vocabularies/core/>
PREFIX task: <http://redpencil.data.gift/vocabularies/tasks/>
PREFIX dbpedia: <http://dbpedia.org/resource/>
PREFIX nfo: <http://www.semanticdesktop.org/ontologies/2007/03/22/nfo#>
PREFIX dct: <http://purl.org/dc/terms/>
PREFIX oslc: <http://open-services.net/ns/core#>
PREFIX cogs: <http://vocab.deri.ie/cogs#>
PREFIX adms: <http://www.w3.org/ns/adms#>
";
