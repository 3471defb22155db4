//! Site snapshot shared by unit tests.
//!
//! Users: 2 is a site admin, 5 edits course 15, 6 is a student in course 15,
//! 8 edits course 15 but is prohibited from adding tags, 9 has no roles.
//! Course 40 is hidden; 5 also edits it.

pub const SAMPLE_SITE: &str = r#"{
  "admins": [2],
  "contexts": [
    {"id": 1, "level": "system"},
    {"id": 3, "level": "coursecat", "parent": 1},
    {"id": 15, "level": "course", "parent": 3},
    {"id": 16, "level": "course", "parent": 3},
    {"id": 30, "level": "module", "parent": 15},
    {"id": 40, "level": "course", "parent": 3, "hidden": true},
    {"id": 41, "level": "module", "parent": 40}
  ],
  "roles": {
    "editingteacher": {
      "moodle/site:manageblocks": "allow",
      "block/html:addinstance": "allow",
      "block/calendar_month:addinstance": "allow",
      "block/section_links:addinstance": "allow",
      "block/tags:addinstance": "allow",
      "block/quiz_results:addinstance": "allow",
      "block/mentees:addinstance": "allow"
    },
    "student": {},
    "notagger": {
      "block/tags:addinstance": "prohibit"
    }
  },
  "role_assignments": [
    {"user": 5, "role": "editingteacher", "context": 15},
    {"user": 5, "role": "editingteacher", "context": 40},
    {"user": 6, "role": "student", "context": 15},
    {"user": 8, "role": "editingteacher", "context": 15},
    {"user": 8, "role": "notagger", "context": 15}
  ],
  "block_types": [
    {"name": "html", "applicable_formats": {"all": true}},
    {"name": "calendar_month", "applicable_formats": {"all": true}},
    {"name": "section_links", "applicable_formats": {"course-view": true},
     "edit_form": {"display_when_adding": true}},
    {"name": "tags", "applicable_formats": {"all": true},
     "edit_form": {"display_when_adding": false}},
    {"name": "quiz_results", "applicable_formats": {"mod-quiz": true}},
    {"name": "mentees", "visible": false, "applicable_formats": {"all": true}}
  ],
  "block_instances": [
    {"block": "calendar_month", "parent_context": 15, "page_type_pattern": "course-view-*", "region": "side-post"},
    {"block": "html", "parent_context": 16, "page_type_pattern": "*", "region": "side-pre"},
    {"block": "tags", "parent_context": 15, "page_type_pattern": "*", "subpage_pattern": "7", "region": "side-pre"}
  ],
  "layouts": {
    "course": ["side-pre", "side-post"],
    "incourse": ["side-pre"],
    "embedded": []
  },
  "edited_pages": {
    "abc123": {"context": 15, "page_type": "course-view-topics", "page_layout": "course", "subpage": ""},
    "hidden01": {"context": 40, "page_type": "course-view-topics", "page_layout": "course"}
  },
  "strings": {
    "en": {
      "block_html": {"pluginname": "Text"},
      "block_calendar_month": {"pluginname": "Calendar"},
      "block_section_links": {"pluginname": "Section links"},
      "block_tags": {"pluginname": "Tags"},
      "block_quiz_results": {"pluginname": "Quiz results"},
      "block_mentees": {"pluginname": "Mentees"}
    },
    "de": {
      "block_html": {"pluginname": "Textblock"}
    }
  }
}"#;
